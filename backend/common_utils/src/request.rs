use error_stack::ResultExt;
use hyperswitch_masking::Maskable;
use serde::{Deserialize, Serialize};

use crate::{consts, errors::ParsingError, CustomResult};

pub type Headers = std::collections::HashSet<(String, Maskable<String>)>;

#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

/// A form-encoded body: ordered `(name, value)` pairs.
pub type FormFields = Vec<(String, Maskable<String>)>;

fn default_request_headers() -> [(String, Maskable<String>); 2] {
    use http::header;

    [
        (
            header::VIA.to_string(),
            consts::VIA_HEADER_VALUE.to_string().into(),
        ),
        (
            header::CONTENT_TYPE.to_string(),
            consts::FORM_URL_ENCODED.to_string().into(),
        ),
    ]
}

#[derive(Debug)]
pub struct Request {
    pub url: String,
    pub headers: Headers,
    pub method: Method,
    pub body: Option<RequestContent>,
}

#[derive(Clone, PartialEq, Eq)]
pub enum RequestContent {
    FormUrlEncoded(FormFields),
}

impl std::fmt::Debug for RequestContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::FormUrlEncoded(_) => "FormUrlEncodedRequestBody",
        })
    }
}

impl RequestContent {
    /// Encodes the body exactly as it goes on the wire.
    pub fn get_inner_value(&self) -> CustomResult<String, ParsingError> {
        match self {
            Self::FormUrlEncoded(fields) => {
                let pairs = fields
                    .iter()
                    .map(|(name, value)| (name.as_str(), value.clone().into_inner()))
                    .collect::<Vec<_>>();
                serde_urlencoded::to_string(pairs).change_context(ParsingError::FormEncodeError)
            }
        }
    }

    /// Renders the body for logs, hiding masked values.
    pub fn masked_serialize(&self) -> serde_json::Value {
        match self {
            Self::FormUrlEncoded(fields) => serde_json::Value::Object(fields.iter().fold(
                serde_json::Map::new(),
                |mut acc, (name, value)| {
                    let logged = match value {
                        Maskable::Masked(secret) => format!("{secret:?}"),
                        Maskable::Normal(value) => value.clone(),
                    };
                    acc.insert(name.clone(), serde_json::Value::String(logged));
                    acc
                },
            )),
        }
    }
}

impl Request {
    pub fn get_headers_map(&self) -> std::collections::HashMap<String, String> {
        self.headers
            .iter()
            .map(|(k, v)| (k.clone(), v.clone().into_inner()))
            .collect()
    }
}

#[derive(Debug)]
pub struct RequestBuilder {
    pub url: String,
    pub headers: Headers,
    pub method: Method,
    pub body: Option<RequestContent>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: Method::Get,
            url: String::with_capacity(1024),
            headers: std::collections::HashSet::new(),
            body: None,
        }
    }

    pub fn url(mut self, url: &str) -> Self {
        self.url = url.into();
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn attach_default_headers(mut self) -> Self {
        self.headers.extend(default_request_headers());
        self
    }

    pub fn header(mut self, header: &str, value: &str) -> Self {
        self.headers.insert((header.into(), value.to_string().into()));
        self
    }

    pub fn set_body<T: Into<RequestContent>>(mut self, body: T) -> Self {
        self.body.replace(body.into());
        self
    }

    pub fn build(self) -> Request {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hyperswitch_masking::Secret;

    use super::*;

    fn card_form() -> RequestContent {
        RequestContent::FormUrlEncoded(vec![
            ("ValorDocumento".to_string(), Maskable::new_normal("1.99".to_string())),
            (
                "NumeroCartao".to_string(),
                Maskable::new_masked(Secret::new("4073020000000002".to_string())),
            ),
            (
                "NomePortadorCartao".to_string(),
                Maskable::new_masked(Secret::new("JOAO DA SILVA".to_string())),
            ),
        ])
    }

    #[test]
    fn form_body_is_url_encoded_with_real_values() {
        let body = card_form().get_inner_value().unwrap();
        assert_eq!(
            body,
            "ValorDocumento=1.99&NumeroCartao=4073020000000002&NomePortadorCartao=JOAO+DA+SILVA"
        );
    }

    #[test]
    fn masked_serialize_hides_card_data() {
        let logged = card_form().masked_serialize();
        assert_eq!(logged["ValorDocumento"], "1.99");
        for field in ["NumeroCartao", "NomePortadorCartao"] {
            let shown = logged[field].as_str().unwrap();
            assert!(shown.starts_with("***"), "{field} leaked as {shown}");
        }
        assert!(!logged.to_string().contains("4073020000000002"));
    }

    #[test]
    fn builder_attaches_default_headers() {
        let request = RequestBuilder::new()
            .method(Method::Post)
            .url("http://teste.aprovafacil.com/cgi-bin/APFW/usuario/APC")
            .attach_default_headers()
            .set_body(card_form())
            .build();

        let headers = request.get_headers_map();
        assert_eq!(request.method, Method::Post);
        assert_eq!(
            headers.get("content-type").map(String::as_str),
            Some(consts::FORM_URL_ENCODED)
        );
        assert_eq!(
            headers.get("via").map(String::as_str),
            Some(consts::VIA_HEADER_VALUE)
        );
        assert!(request.body.is_some());
    }
}
