use std::collections::HashSet;
use std::net::Ipv4Addr;

/// Hosts and addresses already attempted in this run
///
/// Insertion is the uniqueness test: an insert that does not grow the set
/// means the URL is a duplicate and must be skipped.
#[derive(Debug, Clone, Default)]
pub struct SeenSets {
    hosts: HashSet<String>,
    addrs: HashSet<Ipv4Addr>,
}

impl SeenSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `host`, returning true if it had not been seen before
    pub fn insert_host(&mut self, host: &str) -> bool {
        if self.hosts.contains(host) {
            return false;
        }
        self.hosts.insert(host.to_string())
    }

    /// Records `addr`, returning true if it had not been seen before
    pub fn insert_addr(&mut self, addr: Ipv4Addr) -> bool {
        self.addrs.insert(addr)
    }

    pub fn contains_host(&self, host: &str) -> bool {
        self.hosts.contains(host)
    }

    pub fn contains_addr(&self, addr: Ipv4Addr) -> bool {
        self.addrs.contains(&addr)
    }

    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    pub fn addr_count(&self) -> usize {
        self.addrs.len()
    }
}
