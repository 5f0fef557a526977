pub mod validation;
pub mod xml_utils;

pub use validation::{validate, FieldRule, LengthBound, Rule};
pub use xml_utils::{decode_xml, normalize};
