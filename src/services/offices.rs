use std::collections::HashMap;

use crate::models::{LatLng, Office};

/// Resolves an office code to its registered location
///
/// The directory is an external collaborator; the pipeline only needs the
/// lookup. An unknown code is a hard client-input failure, distinct from an
/// empty candidate pool.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait OfficeDirectory: Send + Sync {
    async fn find(&self, code: &str) -> Option<Office>;
}

/// In-memory directory seeded with the registered offices
pub struct InMemoryOfficeDirectory {
    offices: HashMap<String, Office>,
}

impl InMemoryOfficeDirectory {
    pub fn new(offices: impl IntoIterator<Item = Office>) -> Self {
        Self {
            offices: offices
                .into_iter()
                .map(|office| (office.code.clone(), office))
                .collect(),
        }
    }

    /// Directory with the two default offices.
    pub fn with_defaults() -> Self {
        Self::new([
            Office {
                code: "seoul".to_string(),
                name: "Seoul Office".to_string(),
                location: LatLng {
                    lat: 37.5093056,
                    lng: 127.0610611,
                },
            },
            Office {
                code: "daejeon".to_string(),
                name: "Daejeon Office".to_string(),
                location: LatLng {
                    lat: 36.39116,
                    lng: 127.40800,
                },
            },
        ])
    }
}

#[async_trait::async_trait]
impl OfficeDirectory for InMemoryOfficeDirectory {
    async fn find(&self, code: &str) -> Option<Office> {
        self.offices.get(code).cloned()
    }
}
