use common_utils::{consts, CustomResult};
use domain_types::errors::ConnectorError;
use error_stack::{report, ResultExt};
use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};
use serde_json::{Map, Value};

/// Key holding an element's text when the element also has children or attributes.
pub const CONTENT_KEY: &str = "content";

#[derive(Debug, Default)]
struct Element {
    name: String,
    entries: Map<String, Value>,
    text: String,
}

impl Element {
    fn open(start: &BytesStart<'_>, reader: &Reader<&[u8]>) -> CustomResult<Self, ConnectorError> {
        let decoder = reader.decoder();
        let mut entries = Map::new();
        for attribute in start.attributes() {
            let attribute =
                attribute.change_context(ConnectorError::ResponseDeserializationFailed)?;
            let key = decoder
                .decode(attribute.key.as_ref())
                .change_context(ConnectorError::ResponseDeserializationFailed)?;
            let value = attribute
                .decode_and_unescape_value(reader)
                .change_context(ConnectorError::ResponseDeserializationFailed)?;
            entries.insert(key.into_owned(), Value::String(value.into_owned()));
        }
        let qname = start.name();
        let name = decoder
            .decode(qname.as_ref())
            .change_context(ConnectorError::ResponseDeserializationFailed)?;
        Ok(Self {
            name: name.into_owned(),
            entries,
            text: String::new(),
        })
    }

    fn append_child(&mut self, name: String, value: Value) {
        match self.entries.get_mut(&name) {
            Some(Value::Array(siblings)) => siblings.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                self.entries.insert(name, value);
            }
        }
    }

    fn close(self) -> (String, Value) {
        let has_text = !self.text.trim().is_empty();
        let value = match (self.entries.is_empty(), has_text) {
            (true, true) => Value::String(self.text),
            (true, false) => Value::Object(Map::new()),
            (false, true) => {
                let mut entries = self.entries;
                entries.insert(CONTENT_KEY.to_string(), Value::String(self.text));
                Value::Object(entries)
            }
            (false, false) => Value::Object(self.entries),
        };
        (self.name, value)
    }
}

/// Decodes a gateway XML body into a nested mapping, dropping the root element.
///
/// Child elements become keys. A single child is kept as is; repeated siblings
/// become a sequence. Attributes become keys of their element. An element with
/// neither text nor children decodes to an empty mapping. Whitespace-only text
/// between elements is ignored.
///
/// Text is decoded with the encoding named in the XML declaration (or BOM),
/// UTF-8 when there is none.
pub fn decode_xml(body: &[u8]) -> CustomResult<Map<String, Value>, ConnectorError> {
    let mut reader = Reader::from_reader(body.strip_prefix(consts::UTF8_BOM).unwrap_or(body));
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Value> = None;

    loop {
        let event = reader
            .read_event()
            .change_context(ConnectorError::ResponseDeserializationFailed)
            .attach_printable_lazy(|| {
                format!("invalid XML at position {}", reader.buffer_position())
            })?;
        match event {
            Event::Start(start) => stack.push(Element::open(&start, &reader)?),
            Event::Empty(start) => {
                let (name, value) = Element::open(&start, &reader)?.close();
                match stack.last_mut() {
                    Some(parent) => parent.append_child(name, value),
                    None => root = Some(value),
                }
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    let text = text
                        .unescape()
                        .change_context(ConnectorError::ResponseDeserializationFailed)?;
                    current.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    let data = reader
                        .decoder()
                        .decode(&data)
                        .change_context(ConnectorError::ResponseDeserializationFailed)?;
                    current.text.push_str(&data);
                }
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| report!(ConnectorError::ResponseDeserializationFailed))?;
                let (name, value) = element.close();
                match stack.last_mut() {
                    Some(parent) => parent.append_child(name, value),
                    None => root = Some(value),
                }
            }
            Event::Eof => break,
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
        }
    }

    if !stack.is_empty() {
        return Err(report!(ConnectorError::ResponseDeserializationFailed)
            .attach_printable("unexpected end of document"));
    }

    match root {
        Some(Value::Object(entries)) => Ok(entries),
        Some(text) => Ok(Map::from_iter([(CONTENT_KEY.to_string(), text)])),
        None => Err(report!(ConnectorError::ResponseDeserializationFailed)
            .attach_printable("document has no root element")),
    }
}

/// Trims every string leaf of a document. Keys and non-string scalars are left alone.
pub fn normalize(document: Value) -> Value {
    match document {
        Value::String(text) => Value::String(text.trim().to_string()),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize).collect()),
        Value::Object(entries) => Value::Object(
            entries
                .into_iter()
                .map(|(key, value)| (key, normalize(value)))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    const APC_ERROR: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<ResultadoAPC>
    <TransacaoAprovada>False</TransacaoAprovada>
    <ResultadoSolicitacaoAprovacao>  Nao Autorizado - 32  </ResultadoSolicitacaoAprovacao>
    <CodigoAutorizacao></CodigoAutorizacao>
    <Transacao>73397880137091</Transacao>
    <CartaoMascarado>407302******0002</CartaoMascarado>
    <NumeroDocumento/>
    <EnderecoAVS>
        <Endereco></Endereco>
        <Numero/>
    </EnderecoAVS>
</ResultadoAPC>"#;

    #[test]
    fn decodes_without_root_and_keeps_empty_elements() {
        let decoded = decode_xml(APC_ERROR.as_bytes()).unwrap();
        assert_eq!(
            Value::Object(decoded),
            json!({
                "TransacaoAprovada": "False",
                "ResultadoSolicitacaoAprovacao": "  Nao Autorizado - 32  ",
                "CodigoAutorizacao": {},
                "Transacao": "73397880137091",
                "CartaoMascarado": "407302******0002",
                "NumeroDocumento": {},
                "EnderecoAVS": {"Endereco": {}, "Numero": {}},
            })
        );
    }

    #[test]
    fn repeated_siblings_become_a_sequence() {
        let decoded =
            decode_xml(b"<r><Parcela>1</Parcela><Parcela>2</Parcela><Parcela/></r>").unwrap();
        assert_eq!(decoded["Parcela"], json!(["1", "2", {}]));
    }

    #[test]
    fn attributes_and_mixed_text() {
        let decoded = decode_xml(br#"<r><Valor moeda="BRL">1.99</Valor><Vazio a="1"/></r>"#)
            .unwrap();
        assert_eq!(decoded["Valor"], json!({"moeda": "BRL", "content": "1.99"}));
        assert_eq!(decoded["Vazio"], json!({"a": "1"}));
    }

    #[test]
    fn entities_and_bom_are_handled() {
        let decoded = decode_xml("\u{feff}<r><Msg>Erro &amp; falha</Msg></r>".as_bytes()).unwrap();
        assert_eq!(decoded["Msg"], "Erro & falha");
    }

    #[test]
    fn declared_latin1_is_decoded() {
        let decoded = decode_xml(
            b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\
              <r><Msg origem=\"Cart\xe3o\">Erro \xad Transa\xe7\xe3o</Msg><![CDATA[n\xe3o]]></r>",
        )
        .unwrap();
        assert_eq!(
            decoded["Msg"],
            json!({"origem": "Cart\u{e3}o", "content": "Erro \u{ad} Transa\u{e7}\u{e3}o"})
        );
        assert_eq!(decoded["content"], "n\u{e3}o");

        let utf8 = decode_xml("<r><Msg>Transação</Msg></r>".as_bytes()).unwrap();
        assert_eq!(utf8["Msg"], "Transação");
    }

    #[test]
    fn malformed_documents_are_rejected() {
        for body in ["", "   ", "<r><a></b></r>", "<r><a>"] {
            let err = decode_xml(body.as_bytes()).unwrap_err();
            assert_eq!(
                err.current_context(),
                &ConnectorError::ResponseDeserializationFailed,
                "{body:?} should fail"
            );
        }
    }

    #[test]
    fn normalize_trims_nested_strings() {
        let document = json!({"a": " x ", "b": [" y ", " z "], "c": {"d": " w "}});
        assert_eq!(
            normalize(document),
            json!({"a": "x", "b": ["y", "z"], "c": {"d": "w"}})
        );
    }

    #[test]
    fn normalize_leaves_other_scalars_and_empty_mappings() {
        let document = json!({"x": 1, "e": {}, "n": null, "t": true, " k ": " v\n"});
        let normalized = normalize(document);
        assert_eq!(
            normalized,
            json!({"x": 1, "e": {}, "n": null, "t": true, " k ": "v"})
        );
        assert_eq!(normalize(normalized.clone()), normalized);
    }

    #[test]
    fn normalize_keeps_inner_whitespace() {
        assert_eq!(
            normalize(json!(" Erro%20ou \n%20jE1 ")),
            json!("Erro%20ou \n%20jE1")
        );
    }
}
