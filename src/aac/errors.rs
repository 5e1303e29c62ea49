use crate::bytesio::bits_errors::BitError;

#[derive(Debug, thiserror::Error)]
pub enum AacErrorValue {
    #[error("bit error")]
    BitError(BitError),
    #[error("unsupported sampling frequency index: {0}")]
    UnsupportedSamplingFrequencyIndex(u8),
}

#[derive(Debug, thiserror::Error)]
#[error("{value}")]
pub struct AacError {
    pub value: AacErrorValue,
}

impl From<AacErrorValue> for AacError {
    fn from(value: AacErrorValue) -> Self {
        Self { value }
    }
}

impl From<BitError> for AacError {
    fn from(error: BitError) -> Self {
        Self {
            value: AacErrorValue::BitError(error),
        }
    }
}
