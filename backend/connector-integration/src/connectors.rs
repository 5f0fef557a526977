pub mod aprovafacil;
pub use self::aprovafacil::AprovaFacil;
