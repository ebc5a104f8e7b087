//! Physical group registry.
//!
//! Element groups and node sets each keep a bijective name <-> id mapping.
//! Element group ids start at 0 (`"alldomain"`, the whole bulk mesh);
//! node-set ids start at [`NODE_SET_ID_OFFSET`]` + 1`.

use crate::mesh_error::MeshGenError;
use std::collections::HashMap;
use std::fmt;

/// Name of the element group holding every bulk element.
pub const ALL_DOMAIN: &str = "alldomain";
/// Id of [`ALL_DOMAIN`].
pub const ALL_DOMAIN_ID: i32 = 0;
/// Node-set ids are numbered above this value.
pub const NODE_SET_ID_OFFSET: i32 = 10000;

/// Address of a group, by id or by name.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum GroupKey {
    Id(i32),
    Name(String),
}

impl From<i32> for GroupKey {
    fn from(id: i32) -> Self {
        GroupKey::Id(id)
    }
}

impl From<&str> for GroupKey {
    fn from(name: &str) -> Self {
        GroupKey::Name(name.to_string())
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Id(id) => write!(f, "#{id}"),
            GroupKey::Name(name) => f.write_str(name),
        }
    }
}

/// Registered group: id, name, dimension and number of members
/// (elements for element groups, nodes for node sets).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GroupInfo {
    pub id: i32,
    pub name: String,
    pub dim: u8,
    pub size: usize,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct GroupTable {
    groups: Vec<GroupInfo>,
    by_name: HashMap<String, usize>,
    by_id: HashMap<i32, usize>,
}

impl GroupTable {
    fn insert(&mut self, info: GroupInfo) -> Result<(), MeshGenError> {
        if self.by_name.contains_key(&info.name) || self.by_id.contains_key(&info.id) {
            return Err(MeshGenError::DuplicateGroup {
                name: info.name,
                id: info.id,
            });
        }
        let slot = self.groups.len();
        self.by_name.insert(info.name.clone(), slot);
        self.by_id.insert(info.id, slot);
        self.groups.push(info);
        Ok(())
    }

    fn get(&self, key: &GroupKey) -> Option<&GroupInfo> {
        let slot = match key {
            GroupKey::Id(id) => self.by_id.get(id),
            GroupKey::Name(name) => self.by_name.get(name),
        }?;
        self.groups.get(*slot)
    }
}

/// Registry of element groups and node-set groups for one mesh.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PhysicalGroupRegistry {
    elements: GroupTable,
    node_sets: GroupTable,
}

impl PhysicalGroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an element group. Ids must be non-negative and below the node-set range.
    pub fn register_element_group(
        &mut self,
        name: &str,
        id: i32,
        dim: u8,
        size: usize,
    ) -> Result<(), MeshGenError> {
        if !(0..NODE_SET_ID_OFFSET).contains(&id) {
            return Err(MeshGenError::InvalidGroupId {
                id,
                kind: "element group",
            });
        }
        self.elements.insert(GroupInfo {
            id,
            name: name.to_string(),
            dim,
            size,
        })
    }

    /// Registers a node set. Ids must be above [`NODE_SET_ID_OFFSET`].
    pub fn register_node_set(
        &mut self,
        name: &str,
        id: i32,
        size: usize,
    ) -> Result<(), MeshGenError> {
        if id <= NODE_SET_ID_OFFSET {
            return Err(MeshGenError::InvalidGroupId { id, kind: "node set" });
        }
        self.node_sets.insert(GroupInfo {
            id,
            name: name.to_string(),
            dim: 0,
            size,
        })
    }

    pub fn element_group(&self, key: impl Into<GroupKey>) -> Option<&GroupInfo> {
        self.elements.get(&key.into())
    }

    pub fn node_set(&self, key: impl Into<GroupKey>) -> Option<&GroupInfo> {
        self.node_sets.get(&key.into())
    }

    /// Like [`element_group`](Self::element_group) but an unknown key is an error.
    pub fn try_element_group(&self, key: impl Into<GroupKey>) -> Result<&GroupInfo, MeshGenError> {
        let key = key.into();
        self.elements
            .get(&key)
            .ok_or_else(|| MeshGenError::UnknownGroup(key.to_string()))
    }

    pub fn try_node_set(&self, key: impl Into<GroupKey>) -> Result<&GroupInfo, MeshGenError> {
        let key = key.into();
        self.node_sets
            .get(&key)
            .ok_or_else(|| MeshGenError::UnknownGroup(key.to_string()))
    }

    /// Element groups in registration order.
    pub fn element_groups(&self) -> impl Iterator<Item = &GroupInfo> {
        self.elements.groups.iter()
    }

    /// Node sets in registration order.
    pub fn node_sets(&self) -> impl Iterator<Item = &GroupInfo> {
        self.node_sets.groups.iter()
    }

    pub fn element_group_count(&self) -> usize {
        self.elements.groups.len()
    }

    pub fn node_set_count(&self) -> usize {
        self.node_sets.groups.len()
    }
}
