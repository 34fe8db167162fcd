use std::fmt;

use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// One decoded answer from the grid nodes endpoint.
///
/// Only the `userdata` counts are kept; anything else in the payload is ignored.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeStatus {
    pub userdata: NodeCounts,
}

/// Node health counts. Missing or `null` counts are read as zero.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeCounts {
    pub up: f64,
    pub down: f64,
    pub inactive: f64,
}

// Both levels must be JSON objects (or null); arrays are rejected.
impl<'de> Deserialize<'de> for NodeStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StatusVisitor;

        impl<'de> Visitor<'de> for StatusVisitor {
            type Value = NodeStatus;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object with a `userdata` object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<NodeStatus, A::Error> {
                let mut status = NodeStatus::default();
                while let Some(key) = map.next_key::<String>()? {
                    if key == "userdata" {
                        status.userdata = map
                            .next_value::<Option<NodeCounts>>()?
                            .unwrap_or_default();
                    } else {
                        map.next_value::<IgnoredAny>()?;
                    }
                }
                Ok(status)
            }
        }

        deserializer.deserialize_map(StatusVisitor)
    }
}

impl<'de> Deserialize<'de> for NodeCounts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CountsVisitor;

        impl<'de> Visitor<'de> for CountsVisitor {
            type Value = NodeCounts;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object with numeric `up`, `down` and `inactive` counts")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<NodeCounts, A::Error> {
                let mut counts = NodeCounts::default();
                while let Some(key) = map.next_key::<String>()? {
                    let slot = match key.as_str() {
                        "up" => &mut counts.up,
                        "down" => &mut counts.down,
                        "inactive" => &mut counts.inactive,
                        _ => {
                            map.next_value::<IgnoredAny>()?;
                            continue;
                        }
                    };
                    // a repeated key overwrites the earlier value
                    *slot = map.next_value::<Option<f64>>()?.unwrap_or_default();
                }
                Ok(counts)
            }
        }

        deserializer.deserialize_map(CountsVisitor)
    }
}

impl NodeStatus {
    /// Decodes a response body. A bare `null` body yields an all-zero snapshot.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        let status: Option<NodeStatus> = serde_json::from_slice(body)?;
        Ok(status.unwrap_or_default())
    }

    pub fn counts(&self) -> NodeCounts {
        self.userdata
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UP: {:.0}\tDOWN: {:.0}\tINACTIVE: {:.0}",
            self.userdata.up, self.userdata.down, self.userdata.inactive
        )
    }
}
