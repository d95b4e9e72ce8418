use serde::de::{Deserialize, Error, SeqAccess};

/// Extract the next element from a sequence accessor, failing with a
/// `missing_field` error naming `field` if the sequence is exhausted.
///
/// Used by the positional-array kline deserializers.
pub fn extract_next<'de, Seq, T>(seq: &mut Seq, field: &'static str) -> Result<T, Seq::Error>
where
    Seq: SeqAccess<'de>,
    T: Deserialize<'de>,
{
    seq.next_element::<T>()?
        .ok_or_else(|| <Seq::Error as Error>::missing_field(field))
}
