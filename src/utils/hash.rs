use std::collections::{HashMap, HashSet};

/// Hash maps keyed by small, trusted values like names and handles.
pub type FastHashMap<K, V> = HashMap<K, V>;
pub type FastHashSet<K> = HashSet<K>;
