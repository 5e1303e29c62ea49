use indexmap::IndexMap;

/// A dynamic AMF0 value. AMF3 decodes into the same variant set (see
/// `amf0::amf3`); the engine only ever *emits* AMF0, per the external
/// interface contract.
#[derive(Debug, Clone, PartialEq)]
pub enum Amf0Value {
    Number(f64),
    Boolean(bool),
    String(String),
    Object(IndexMap<String, Amf0Value>),
    Null,
    Undefined,
    EcmaArray(IndexMap<String, Amf0Value>),
    StrictArray(Vec<Amf0Value>),
    /// milliseconds since epoch, plus the (unused by RTMP) timezone field.
    Date { unix_ms: f64, tz: i16 },
    LongString(String),
}

impl Amf0Value {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::LongString(s) => Some(s.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&IndexMap<String, Amf0Value>> {
        match self {
            Self::Object(o) | Self::EcmaArray(o) => Some(o),
            _ => None,
        }
    }
}

impl From<&str> for Amf0Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Amf0Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<f64> for Amf0Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for Amf0Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}
