use crate::bucket::{BucketMapError, BucketNodeMap, FixedMapping, observe};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};
use std::collections::BTreeMap;

///
/// BucketNodeMapRecord
///
/// Wire shape of a descriptor. Decoding goes back through the factories so a
/// record can never produce an instance the factories would reject.
///

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct BucketNodeMapRecord<N> {
    bucket_count: Option<i32>,
    bucket_to_node: Option<BTreeMap<i32, N>>,
}

#[derive(Serialize)]
struct BucketNodeMapRecordRef<'a, N> {
    bucket_count: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    bucket_to_node: Option<&'a FixedMapping<N>>,
}

impl<N: Clone> BucketNodeMap<N> {
    fn from_record(record: BucketNodeMapRecord<N>) -> Result<Self, BucketMapError> {
        match (record.bucket_count, record.bucket_to_node) {
            (declared, Some(bucket_to_node)) => observe(Self::build_fixed(
                &bucket_to_node,
                declared.map(i64::from),
            )),
            (Some(bucket_count), None) => Self::dynamic(bucket_count),
            (None, None) => Self::fixed_opt::<&BTreeMap<i32, N>>(None),
        }
    }
}

impl<N: Serialize> Serialize for BucketNodeMap<N> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        BucketNodeMapRecordRef {
            bucket_count: self.bucket_count(),
            bucket_to_node: self.as_fixed(),
        }
        .serialize(serializer)
    }
}

impl<'de, N> Deserialize<'de> for BucketNodeMap<N>
where
    N: Clone + Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let record = BucketNodeMapRecord::<N>::deserialize(deserializer)?;

        Self::from_record(record).map_err(D::Error::custom)
    }
}
