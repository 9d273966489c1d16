//! Contact list (C12): bidirectional maps long-ID <-> short-ID <-> app
//! connection indices, plus per-peer state, grounded on
//! `mac/contact_list.cpp` (two parallel hash maps, uniqueness on both sides).

use std::collections::HashMap;

use crate::common::Expiring;
use crate::error::ConfigError;
use crate::mac::allocation::Allocation;
use crate::mac::identity::{Identity, LongRadioDeviceId, ShortRadioDeviceId};

/// Per-peer MIMO/CSI cache and allocation, owned exclusively by the
/// firmware; peers outside the firmware hold only the long-ID key.
#[derive(Debug, Clone)]
pub struct Contact {
    pub identity: Identity,
    pub allocation: Option<Allocation>,
    pub expiring_mcs: Option<Expiring<u32>>,
    pub expiring_codebook_index: Option<Expiring<u32>>,
    pub expiring_tm_mode: Option<Expiring<u32>>,
    pub conn_server: usize,
    pub conn_client: usize,
}

impl Contact {
    pub fn new(identity: Identity, conn_server: usize, conn_client: usize) -> Self {
        Self {
            identity,
            allocation: None,
            expiring_mcs: None,
            expiring_codebook_index: None,
            expiring_tm_mode: None,
            conn_server,
            conn_client,
        }
    }
}

#[derive(Debug, Default)]
pub struct ContactList {
    contacts: Vec<Contact>,
    long_to_short: HashMap<u32, u16>,
    short_to_long: HashMap<u16, u32>,
    long_to_server: HashMap<u32, usize>,
    server_to_long: HashMap<usize, u32>,
    long_to_client: HashMap<u32, usize>,
    client_to_long: HashMap<usize, u32>,
    long_to_index: HashMap<u32, usize>,
}

impl ContactList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves capacity and inserts a new contact, failing with
    /// `DuplicateIdentity` if any of the three bidirectional maps already
    /// contains either side of the key.
    pub fn add_new_contact(&mut self, contact: Contact) -> Result<(), ConfigError> {
        let long = contact.identity.long_id.0;
        let short = contact.identity.short_id.0;
        let server = contact.conn_server;
        let client = contact.conn_client;

        if self.long_to_short.contains_key(&long)
            || self.short_to_long.contains_key(&short)
            || self.long_to_server.contains_key(&long)
            || self.server_to_long.contains_key(&server)
            || self.long_to_client.contains_key(&long)
            || self.client_to_long.contains_key(&client)
        {
            return Err(ConfigError::DuplicateIdentity);
        }

        let idx = self.contacts.len();
        self.contacts.push(contact);
        self.long_to_short.insert(long, short);
        self.short_to_long.insert(short, long);
        self.long_to_server.insert(long, server);
        self.server_to_long.insert(server, long);
        self.long_to_client.insert(long, client);
        self.client_to_long.insert(client, long);
        self.long_to_index.insert(long, idx);
        Ok(())
    }

    pub fn get_by_long_id(&self, long: LongRadioDeviceId) -> Option<&Contact> {
        self.long_to_index.get(&long.0).map(|&i| &self.contacts[i])
    }

    pub fn get_by_long_id_mut(&mut self, long: LongRadioDeviceId) -> Option<&mut Contact> {
        match self.long_to_index.get(&long.0) {
            Some(&i) => Some(&mut self.contacts[i]),
            None => None,
        }
    }

    pub fn short_id_of(&self, long: LongRadioDeviceId) -> Option<ShortRadioDeviceId> {
        self.long_to_short.get(&long.0).map(|&s| ShortRadioDeviceId(s))
    }

    pub fn long_id_of_short(&self, short: ShortRadioDeviceId) -> Option<LongRadioDeviceId> {
        self.short_to_long.get(&short.0).map(|&l| LongRadioDeviceId(l))
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mac::identity::NetworkId;

    fn identity(long: u32, short: u16) -> Identity {
        Identity {
            network_id: NetworkId(1),
            long_id: LongRadioDeviceId(long),
            short_id: ShortRadioDeviceId(short),
        }
    }

    #[test]
    fn duplicate_long_id_rejected() {
        let mut list = ContactList::new();
        list.add_new_contact(Contact::new(identity(1, 10), 0, 0)).unwrap();
        let err = list.add_new_contact(Contact::new(identity(1, 11), 1, 1));
        assert!(matches!(err, Err(ConfigError::DuplicateIdentity)));
    }

    #[test]
    fn duplicate_short_id_rejected() {
        let mut list = ContactList::new();
        list.add_new_contact(Contact::new(identity(1, 10), 0, 0)).unwrap();
        let err = list.add_new_contact(Contact::new(identity(2, 10), 1, 1));
        assert!(matches!(err, Err(ConfigError::DuplicateIdentity)));
    }

    #[test]
    fn lookup_round_trip() {
        let mut list = ContactList::new();
        list.add_new_contact(Contact::new(identity(7, 70), 3, 4)).unwrap();
        assert_eq!(list.short_id_of(LongRadioDeviceId(7)), Some(ShortRadioDeviceId(70)));
        assert_eq!(list.long_id_of_short(ShortRadioDeviceId(70)), Some(LongRadioDeviceId(7)));
        assert!(list.get_by_long_id(LongRadioDeviceId(7)).is_some());
    }
}
