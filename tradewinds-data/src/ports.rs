//! Ports, the passages between them, and named trade routes.

use crate::encounters::WaterBody;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type PortId = String;

/// Settlement size. Size sets the merchant/demand modifier for every
/// market interaction at the port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortSize {
    Anchorage,
    MinorPort,
    Port,
    MajorPort,
}

impl PortSize {
    pub fn demand_modifier(&self) -> i32 {
        match self {
            PortSize::MajorPort => 2,
            PortSize::Port => 1,
            PortSize::MinorPort => 0,
            PortSize::Anchorage => -2,
        }
    }

    /// Repairs and crew hiring require a yard; anchorages have none.
    pub fn has_shipyard(&self) -> bool {
        !matches!(self, PortSize::Anchorage)
    }
}

impl std::fmt::Display for PortSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PortSize::Anchorage => "Anchorage",
            PortSize::MinorPort => "Minor Port",
            PortSize::Port => "Port",
            PortSize::MajorPort => "Major Port",
        };
        write!(f, "{s}")
    }
}

/// A sailable passage out of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    pub distance_mi: u32,
    pub water: WaterBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortDef {
    pub id: PortId,
    pub name: String,
    pub size: PortSize,
    pub connections: HashMap<PortId, Passage>,
}

/// An ordered list of ports. A circuit closes back to its first port; the
/// engine appends the closing leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDef {
    pub id: String,
    pub name: String,
    pub ports: Vec<PortId>,
    pub circuit: bool,
}

#[derive(Debug, Clone)]
pub struct PortRegistry {
    ports: HashMap<PortId, PortDef>,
    routes: HashMap<String, RouteDef>,
}

impl PortRegistry {
    pub fn port(&self, id: &str) -> Option<&PortDef> {
        self.ports.get(id)
    }

    pub fn route(&self, id: &str) -> Option<&RouteDef> {
        self.routes.get(id)
    }

    pub fn passage(&self, from: &str, to: &str) -> Option<Passage> {
        self.ports.get(from)?.connections.get(to).copied()
    }

    pub fn port_ids(&self) -> impl Iterator<Item = &PortId> {
        self.ports.keys()
    }

    pub fn route_ids(&self) -> impl Iterator<Item = &String> {
        self.routes.keys()
    }

    /// The built-in Amber Coast chart: ten ports, four routes.
    pub fn builtin() -> Self {
        let mut b = RegistryBuilder::default();

        b.port("saltmere", "Saltmere", PortSize::MajorPort);
        b.port("gullhaven", "Gullhaven", PortSize::Port);
        b.port("tarwick", "Tarwick", PortSize::MinorPort);
        b.port("brinecliff", "Brinecliff", PortSize::Anchorage);
        b.port("westreach", "Westreach", PortSize::MajorPort);
        b.port("mirrowbay", "Mirrow Bay", PortSize::Port);
        b.port("ashport", "Ashport", PortSize::Port);
        b.port("kelfirth", "Kelfirth", PortSize::MinorPort);
        b.port("norlock", "Norlock", PortSize::MinorPort);
        b.port("emberquay", "Ember Quay", PortSize::Anchorage);

        b.passage("saltmere", "gullhaven", 120, WaterBody::Coastal);
        b.passage("saltmere", "brinecliff", 60, WaterBody::Shallow);
        b.passage("saltmere", "ashport", 540, WaterBody::Deep);
        b.passage("gullhaven", "tarwick", 90, WaterBody::Coastal);
        b.passage("gullhaven", "kelfirth", 150, WaterBody::Coastal);
        b.passage("tarwick", "westreach", 260, WaterBody::Coastal);
        b.passage("westreach", "mirrowbay", 180, WaterBody::Coastal);
        b.passage("westreach", "ashport", 420, WaterBody::Deep);
        b.passage("mirrowbay", "ashport", 310, WaterBody::Deep);
        b.passage("mirrowbay", "emberquay", 230, WaterBody::Shallow);
        b.passage("kelfirth", "norlock", 210, WaterBody::Coastal);
        b.passage("norlock", "emberquay", 75, WaterBody::Fresh);

        b.route(
            "amber-run",
            "The Amber Run",
            &["saltmere", "gullhaven", "tarwick", "westreach"],
            false,
        );
        b.route(
            "coast-circuit",
            "Amber Coast Circuit",
            &[
                "saltmere",
                "gullhaven",
                "tarwick",
                "westreach",
                "mirrowbay",
                "ashport",
            ],
            true,
        );
        b.route(
            "spice-run",
            "The Spice Run",
            &["westreach", "mirrowbay", "ashport", "saltmere"],
            false,
        );
        b.route("short-haul", "Brinecliff Shuttle", &["saltmere", "brinecliff"], false);

        b.build()
    }
}

#[derive(Default)]
struct RegistryBuilder {
    ports: HashMap<PortId, PortDef>,
    routes: HashMap<String, RouteDef>,
}

impl RegistryBuilder {
    fn port(&mut self, id: &str, name: &str, size: PortSize) {
        self.ports.insert(
            id.to_string(),
            PortDef {
                id: id.to_string(),
                name: name.to_string(),
                size,
                connections: HashMap::new(),
            },
        );
    }

    /// Passages are two-way; both endpoints get the entry.
    fn passage(&mut self, a: &str, b: &str, distance_mi: u32, water: WaterBody) {
        let p = Passage { distance_mi, water };
        if let Some(port) = self.ports.get_mut(a) {
            port.connections.insert(b.to_string(), p);
        }
        if let Some(port) = self.ports.get_mut(b) {
            port.connections.insert(a.to_string(), p);
        }
    }

    fn route(&mut self, id: &str, name: &str, ports: &[&str], circuit: bool) {
        self.routes.insert(
            id.to_string(),
            RouteDef {
                id: id.to_string(),
                name: name.to_string(),
                ports: ports.iter().map(|p| p.to_string()).collect(),
                circuit,
            },
        );
    }

    fn build(self) -> PortRegistry {
        PortRegistry {
            ports: self.ports,
            routes: self.routes,
        }
    }
}
