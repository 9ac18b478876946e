//! Facts the view needs, derived from mirror contents.

use crate::types::{Address, ModuleSet, ResourceData, ResourceSet, MESSAGE_MODULE};

pub fn has_message_module(modules: &ModuleSet) -> bool {
    modules.iter().any(|m| m.abi_name() == Some(MESSAGE_MODULE))
}

/// All message-holder payloads for `address`, in resource order (still hex).
pub fn message_records<'a>(
    resources: &'a ResourceSet,
    address: &Address,
) -> impl Iterator<Item = &'a str> + 'a {
    let holder_type = address.message_holder_type();
    resources
        .records()
        .iter()
        .filter(move |r| r.type_tag == holder_type)
        .filter_map(|r| match &r.data {
            ResourceData::MessageHolder(h) => Some(h.message.as_str()),
            ResourceData::Opaque(_) => None,
        })
}

/// First match wins. The value is hex; decode at render time.
pub fn current_message<'a>(resources: &'a ResourceSet, address: &Address) -> Option<&'a str> {
    message_records(resources, address).next()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub current: Option<String>,
    /// Matching records beyond the first. Non-zero is a data anomaly.
    pub duplicates: usize,
}

impl MessageView {
    pub fn project(resources: &ResourceSet, address: &Address) -> Self {
        let mut matches = message_records(resources, address);
        let current = matches.next().map(str::to_string);
        let duplicates = matches.count();
        MessageView {
            current,
            duplicates,
        }
    }
}
