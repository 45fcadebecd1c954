// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Value Objects with Validation Invariants

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;

/// Network validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Invalid IPv4 address format: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid CIDR notation: {0}")]
    InvalidCidr(String),

    #[error("Invalid prefix length: {0} (must be 0-32)")]
    InvalidPrefixLength(u8),

    #[error("Address {address} has host bits set for /{prefix}")]
    HostBitsSet { address: Ipv4Addr, prefix: u8 },

    #[error("Cannot carve /{mask} subnet #{index} out of {block}")]
    SubnetOutOfRange { block: String, mask: u8, index: u32 },

    #[error("Invalid port: {0}")]
    InvalidPort(u16),
}

/// IPv4 block in CIDR notation
///
/// Invariants:
/// - Valid IPv4 address
/// - Prefix length 0-32
/// - No host bits set (the address is the network address)
///
/// # Examples
///
/// ```rust
/// use rim_infrastructure::domain::Ipv4Cidr;
///
/// let vpc = Ipv4Cidr::new("10.0.0.0/16").unwrap();
/// assert_eq!(vpc.subnet(24, 2).unwrap().to_string(), "10.0.2.0/24");
/// assert!(Ipv4Cidr::new("10.0.0.1/16").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ipv4Cidr {
    address: Ipv4Addr,
    prefix_length: u8,
}

impl Ipv4Cidr {
    /// The block matching every IPv4 source
    pub const ANYWHERE: Ipv4Cidr = Ipv4Cidr {
        address: Ipv4Addr::UNSPECIFIED,
        prefix_length: 0,
    };

    /// Parse a block such as `10.0.0.0/16`
    pub fn new(cidr: impl AsRef<str>) -> Result<Self, NetworkError> {
        let cidr = cidr.as_ref();

        let (addr_str, prefix_str) = cidr
            .split_once('/')
            .ok_or_else(|| NetworkError::InvalidCidr(cidr.to_string()))?;

        let address = Ipv4Addr::from_str(addr_str)
            .map_err(|_| NetworkError::InvalidIpAddress(addr_str.to_string()))?;

        let prefix_length = prefix_str
            .parse::<u8>()
            .map_err(|_| NetworkError::InvalidCidr(cidr.to_string()))?;

        Self::from_parts(address, prefix_length)
    }

    /// Create from separate address and prefix
    pub fn from_parts(address: Ipv4Addr, prefix_length: u8) -> Result<Self, NetworkError> {
        if prefix_length > 32 {
            return Err(NetworkError::InvalidPrefixLength(prefix_length));
        }

        // Invariant: the address must be the network address of the block
        if u32::from(address) & !Self::mask_bits(prefix_length) != 0 {
            return Err(NetworkError::HostBitsSet {
                address,
                prefix: prefix_length,
            });
        }

        Ok(Self {
            address,
            prefix_length,
        })
    }

    fn mask_bits(prefix_length: u8) -> u32 {
        if prefix_length == 0 {
            0
        } else {
            u32::MAX << (32 - u32::from(prefix_length))
        }
    }

    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    pub fn prefix_length(&self) -> u8 {
        self.prefix_length
    }

    /// True for `0.0.0.0/0`
    pub fn is_anywhere(&self) -> bool {
        self.prefix_length == 0
    }

    /// Check whether an address falls inside this block
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        u32::from(addr) & Self::mask_bits(self.prefix_length) == u32::from(self.address)
    }

    /// The `index`-th subnet of prefix `mask` inside this block, counting from
    /// the network address
    pub fn subnet(&self, mask: u8, index: u32) -> Result<Self, NetworkError> {
        let out_of_range = || NetworkError::SubnetOutOfRange {
            block: self.to_string(),
            mask,
            index,
        };

        if mask < self.prefix_length || mask > 32 {
            return Err(out_of_range());
        }

        let available = 1u64 << (mask - self.prefix_length);
        if u64::from(index) >= available {
            return Err(out_of_range());
        }

        let size = 1u64 << (32 - mask);
        let base = u64::from(u32::from(self.address)) + u64::from(index) * size;
        let base = u32::try_from(base).map_err(|_| out_of_range())?;

        Self::from_parts(Ipv4Addr::from(base), mask)
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_length)
    }
}

impl FromStr for Ipv4Cidr {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Ipv4Cidr {
    type Error = NetworkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Ipv4Cidr> for String {
    fn from(value: Ipv4Cidr) -> Self {
        value.to_string()
    }
}

/// TCP port value object (1-65535)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Port(u16);

impl Port {
    pub const SSH: Port = Port(22);
    pub const HTTP: Port = Port(80);
    pub const HTTPS: Port = Port(443);

    pub fn new(port: u16) -> Result<Self, NetworkError> {
        if port == 0 {
            return Err(NetworkError::InvalidPort(port));
        }
        Ok(Self(port))
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One inbound rule of a security group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IngressRule {
    pub peer: Ipv4Cidr,
    pub port: Port,
    pub description: String,
}

impl IngressRule {
    pub fn tcp(peer: Ipv4Cidr, port: Port, description: impl Into<String>) -> Self {
        Self {
            peer,
            port,
            description: description.into(),
        }
    }

    /// Whether the rule admits every IPv4 source
    pub fn is_open_to_world(&self) -> bool {
        self.peer.is_anywhere()
    }

    /// `SecurityGroupIngress` entry in CloudFormation shape
    pub fn to_property(&self) -> Value {
        json!({
            "CidrIp": self.peer.to_string(),
            "Description": self.description,
            "FromPort": self.port.value(),
            "IpProtocol": "tcp",
            "ToPort": self.port.value(),
        })
    }
}

/// Subnet partition of the VPC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubnetKind {
    /// Routed to the internet gateway, instances get public addresses
    Public,
    /// No route out of the VPC
    Isolated,
}

impl SubnetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "Public",
            Self::Isolated => "Isolated",
        }
    }
}

impl fmt::Display for SubnetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
