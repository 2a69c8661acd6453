use std::collections::HashMap;
use txpulse_sdk::objects::{MetaError, ModuleError, ModuleErrorEntry};

/// Module error table keyed by (pallet index, error index).
#[derive(Debug, Clone, Default)]
pub struct MetadataRegistry {
    errors: HashMap<(u8, u8), MetaError>,
}

impl MetadataRegistry {
    pub fn from_entries(entries: impl IntoIterator<Item = ModuleErrorEntry>) -> Self {
        let errors = entries
            .into_iter()
            .map(|e| {
                (
                    (e.index, e.error),
                    MetaError {
                        section: e.section,
                        name: e.name,
                    },
                )
            })
            .collect();
        Self { errors }
    }

    pub fn find(&self, module: ModuleError) -> Option<&MetaError> {
        self.errors.get(&(module.index, module.error))
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}
