use std::fmt;

use crate::codec::ZmtpError;

/// ZMQ socket types as announced in the READY `Socket-Type` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketType {
    Pair,
    Dealer,
    Router,
    Pub,
    Sub,
    Req,
    Rep,
    Push,
    Pull,
}

impl SocketType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pair => "PAIR",
            Self::Dealer => "DEALER",
            Self::Router => "ROUTER",
            Self::Pub => "PUB",
            Self::Sub => "SUB",
            Self::Req => "REQ",
            Self::Rep => "REP",
            Self::Push => "PUSH",
            Self::Pull => "PULL",
        }
    }

    pub fn from_wire(value: &[u8]) -> Result<Self, ZmtpError> {
        match value {
            b"PAIR" => Ok(Self::Pair),
            b"DEALER" => Ok(Self::Dealer),
            b"ROUTER" => Ok(Self::Router),
            b"PUB" => Ok(Self::Pub),
            b"SUB" => Ok(Self::Sub),
            b"REQ" => Ok(Self::Req),
            b"REP" => Ok(Self::Rep),
            b"PUSH" => Ok(Self::Push),
            b"PULL" => Ok(Self::Pull),
            _ => Err(ZmtpError::Protocol("unknown Socket-Type")),
        }
    }

    /// Valid socket combinations from the ZMTP 3.x compatibility table.
    #[must_use]
    pub const fn is_compatible_with(&self, peer: SocketType) -> bool {
        use SocketType::*;
        matches!(
            (*self, peer),
            (Req, Rep | Router)
                | (Rep, Req | Dealer)
                | (Dealer, Rep | Dealer | Router)
                | (Router, Req | Dealer | Router)
                | (Pub, Sub)
                | (Sub, Pub)
                | (Push, Pull)
                | (Pull, Push)
                | (Pair, Pair)
        )
    }
}

impl fmt::Display for SocketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
