use std::{
    borrow::Cow,
    collections::{btree_map, BTreeMap},
    fmt,
};

use serde::Serialize;

/// Fields understood by the gateway.
///
/// The serialized form is the field name the gateway expects on the wire.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
pub enum FieldName {
    #[serde(rename = "ValorDocumento")]
    #[strum(serialize = "ValorDocumento")]
    ValueAmount,
    #[serde(rename = "QuantidadeParcelas")]
    #[strum(serialize = "QuantidadeParcelas")]
    InstallmentCount,
    #[serde(rename = "NumeroDocumento")]
    #[strum(serialize = "NumeroDocumento")]
    DocumentNumber,
    #[serde(rename = "TransacaoAnterior")]
    #[strum(serialize = "TransacaoAnterior")]
    PriorTransaction,
    #[serde(rename = "NumeroCartao")]
    #[strum(serialize = "NumeroCartao")]
    CardNumber,
    #[serde(rename = "MesValidade")]
    #[strum(serialize = "MesValidade")]
    ExpiryMonth,
    #[serde(rename = "AnoValidade")]
    #[strum(serialize = "AnoValidade")]
    ExpiryYear,
    #[serde(rename = "CodigoSeguranca")]
    #[strum(serialize = "CodigoSeguranca")]
    SecurityCode,
    #[serde(rename = "EnderecoIPComprador")]
    #[strum(serialize = "EnderecoIPComprador")]
    BuyerIpAddress,
    #[serde(rename = "NomePortadorCartao")]
    #[strum(serialize = "NomePortadorCartao")]
    CardholderName,
    #[serde(rename = "Bandeira")]
    #[strum(serialize = "Bandeira")]
    CardBrand,
    #[serde(rename = "Transacao")]
    #[strum(serialize = "Transacao")]
    TransactionId,
}

impl FieldName {
    /// Card data that must never reach the logs in clear text.
    pub fn is_sensitive(self) -> bool {
        matches!(
            self,
            Self::CardNumber
                | Self::ExpiryMonth
                | Self::ExpiryYear
                | Self::SecurityCode
                | Self::CardholderName
        )
    }
}

/// A caller-supplied value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
    Decimal(f64),
}

impl ParamValue {
    /// Textual form, as posted to the gateway and as seen by the validator.
    ///
    /// Decimals always carry a fractional part (`1.0`, never `1`).
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(value) => Cow::Borrowed(value),
            Self::Integer(value) => Cow::Owned(value.to_string()),
            Self::Decimal(value) if value.is_finite() && value.fract() == 0.0 => {
                Cow::Owned(format!("{value:.1}"))
            }
            Self::Decimal(value) => Cow::Owned(value.to_string()),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl Serialize for ParamValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_text())
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

/// The fields of one gateway call. An absent field and a null field are the same thing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParameterSet(BTreeMap<FieldName, ParamValue>);

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, field: FieldName, value: impl Into<ParamValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: FieldName, value: impl Into<ParamValue>) -> Option<ParamValue> {
        self.0.insert(field, value.into())
    }

    pub fn get(&self, field: FieldName) -> Option<&ParamValue> {
        self.0.get(&field)
    }

    pub fn contains(&self, field: FieldName) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, FieldName, ParamValue> {
        self.0.iter()
    }
}

impl<V: Into<ParamValue>> FromIterator<(FieldName, V)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (FieldName, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = (&'a FieldName, &'a ParamValue);
    type IntoIter = btree_map::Iter<'a, FieldName, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn field_names_use_gateway_wire_names() {
        assert_eq!(FieldName::ValueAmount.to_string(), "ValorDocumento");
        assert_eq!(FieldName::BuyerIpAddress.as_ref(), "EnderecoIPComprador");
        assert_eq!(
            FieldName::from_str("TransacaoAnterior").unwrap(),
            FieldName::PriorTransaction
        );
        assert_eq!(
            serde_json::to_value(FieldName::TransactionId).unwrap(),
            "Transacao"
        );
    }

    #[test]
    fn decimal_text_always_has_a_fraction() {
        assert_eq!(ParamValue::from(1.99).to_text(), "1.99");
        assert_eq!(ParamValue::from(1.0).to_text(), "1.0");
        assert_eq!(ParamValue::from(-42).to_text(), "-42");
        assert_eq!(ParamValue::from("texto").to_text(), "texto");
    }

    #[test]
    fn parameter_set_serializes_as_wire_form() {
        let params = ParameterSet::new()
            .with(FieldName::ValueAmount, 1.99)
            .with(FieldName::InstallmentCount, 1)
            .with(FieldName::CardBrand, "VISA");

        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            serde_json::json!({
                "ValorDocumento": "1.99",
                "QuantidadeParcelas": "1",
                "Bandeira": "VISA",
            })
        );
        assert!(params.contains(FieldName::CardBrand));
        assert!(!params.contains(FieldName::CardNumber));
        assert_eq!(params.len(), 3);
    }
}
