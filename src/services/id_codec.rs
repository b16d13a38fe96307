/*
 * Responsibility
 * - Public id <-> internal BIGSERIAL id (sqids)
 * - Handlers and DTOs only ever see the public form
 */
use sqids::{Error as SqidsError, Sqids};
use std::fmt;

pub type Result<T> = std::result::Result<T, IdCodecError>;

#[derive(Debug)]
pub enum IdCodecError {
    InvalidMinLength { value: usize },
    Sqids(SqidsError),
    NegativeId { value: i64 },
    DecodeInvalidFormat,
    DecodeOutOfRange,
}

impl fmt::Display for IdCodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdCodecError::InvalidMinLength { value } => {
                write!(f, "SQIDS_MIN_LENGTH must fit in 0..=255, got {value}")
            }
            IdCodecError::Sqids(e) => write!(f, "sqids: {e}"),
            IdCodecError::NegativeId { value } => write!(f, "cannot encode negative id {value}"),
            IdCodecError::DecodeInvalidFormat => write!(f, "malformed public id"),
            IdCodecError::DecodeOutOfRange => write!(f, "public id out of range"),
        }
    }
}

impl std::error::Error for IdCodecError {}

impl From<SqidsError> for IdCodecError {
    fn from(e: SqidsError) -> Self {
        IdCodecError::Sqids(e)
    }
}

#[derive(Clone, Debug)]
pub struct IdCodec {
    sqids: Sqids,
}

impl IdCodec {
    pub fn new(min_length: usize, alphabet: &str) -> Result<Self> {
        let min_length: u8 = min_length
            .try_into()
            .map_err(|_| IdCodecError::InvalidMinLength { value: min_length })?;

        let sqids = Sqids::builder()
            .min_length(min_length)
            .alphabet(alphabet.chars().collect())
            .build()?;

        Ok(Self { sqids })
    }

    pub fn encode(&self, id: i64) -> Result<String> {
        let n = u64::try_from(id).map_err(|_| IdCodecError::NegativeId { value: id })?;
        Ok(self.sqids.encode(&[n])?)
    }

    pub fn decode(&self, public_id: &str) -> Result<i64> {
        let nums = self.sqids.decode(public_id.trim());
        let [n] = nums.as_slice() else {
            return Err(IdCodecError::DecodeInvalidFormat);
        };
        let id = i64::try_from(*n).map_err(|_| IdCodecError::DecodeOutOfRange)?;

        // sqids decodes some non-canonical strings; only the canonical form is a valid id
        if self.sqids.encode(&[*n])? != public_id.trim() {
            return Err(IdCodecError::DecodeInvalidFormat);
        }
        Ok(id)
    }

    /// All-or-nothing decode for bulk operations.
    pub fn decode_many<S: AsRef<str>>(&self, public_ids: &[S]) -> Result<Vec<i64>> {
        public_ids.iter().map(|s| self.decode(s.as_ref())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    #[test]
    fn encode_decode() {
        let codec = IdCodec::new(10, ALPHABET).unwrap();
        let public = codec.encode(42).unwrap();
        assert!(public.len() >= 10);
        assert_eq!(codec.decode(&public).unwrap(), 42);
    }

    #[test]
    fn rejects_negative_and_garbage() {
        let codec = IdCodec::new(10, ALPHABET).unwrap();
        assert!(matches!(codec.encode(-1), Err(IdCodecError::NegativeId { .. })));
        assert!(codec.decode("").is_err());
        assert!(codec.decode("!!!").is_err());
    }

    #[test]
    fn min_length_must_fit_u8() {
        assert!(matches!(
            IdCodec::new(300, ALPHABET),
            Err(IdCodecError::InvalidMinLength { value: 300 })
        ));
    }

    #[test]
    fn decode_many_is_all_or_nothing() {
        let codec = IdCodec::new(10, ALPHABET).unwrap();
        let a = codec.encode(1).unwrap();
        let b = codec.encode(2).unwrap();
        assert_eq!(codec.decode_many(&[a.clone(), b]).unwrap(), vec![1, 2]);
        assert!(codec.decode_many(&[a, "!!".to_string()]).is_err());
    }
}
