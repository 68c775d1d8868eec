use crate::codec::ZmtpError;
use bytes::{BufMut, Bytes, BytesMut};

/// ZMTP Greeting is always exactly 64 bytes
pub const GREETING_SIZE: usize = 64;

const SIGNATURE_HEAD: u8 = 0xFF;
const SIGNATURE_TAIL: u8 = 0x7F;

/// Security mechanism named in a greeting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MechanismName {
    Null,
    Plain,
    Curve,
    Unknown(String),
}

impl MechanismName {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Null => "NULL",
            Self::Plain => "PLAIN",
            Self::Curve => "CURVE",
            Self::Unknown(name) => name,
        }
    }
}

/// Parsed greeting information
#[derive(Debug, Clone)]
pub struct ZmtpGreeting {
    pub major: u8,
    pub minor: u8,
    pub mechanism: MechanismName,
    pub as_server: bool,
}

impl ZmtpGreeting {
    /// Parse a 64-byte ZMTP greeting
    ///
    /// Layout (ZMTP 3.x):
    /// ```text
    /// [0]      0xFF
    /// [1..9]   Padding
    /// [9]      0x7F
    /// [10]     Major version
    /// [11]     Minor version
    /// [12..32] Mechanism (ASCII, null-padded)
    /// [32]     As-Server flag
    /// [33..64] Padding
    /// ```
    ///
    /// Any 3.x minor version is accepted (libzmq 4.1 speaks 3.0, 4.2+ speak 3.1).
    pub fn parse(src: &[u8]) -> crate::codec::Result<Self> {
        if src.len() < GREETING_SIZE {
            return Err(ZmtpError::InvalidGreeting("short greeting"));
        }

        if src[0] != SIGNATURE_HEAD || src[9] != SIGNATURE_TAIL {
            return Err(ZmtpError::InvalidGreeting("bad signature"));
        }

        let major = src[10];
        if major < 3 {
            return Err(ZmtpError::InvalidGreeting("ZMTP 3.x required"));
        }

        let mech_str = std::str::from_utf8(&src[12..32])
            .map_err(|_| ZmtpError::InvalidGreeting("mechanism is not ASCII"))?
            .trim_matches(char::from(0));

        let mechanism = match mech_str {
            "NULL" => MechanismName::Null,
            "PLAIN" => MechanismName::Plain,
            "CURVE" => MechanismName::Curve,
            other => MechanismName::Unknown(other.to_string()),
        };

        Ok(Self {
            major,
            minor: src[11],
            mechanism,
            as_server: (src[32] & 0x01) != 0,
        })
    }
}

/// Build our ZMTP 3.0 greeting advertising the NULL mechanism.
///
/// 3.0 keeps libzmq 4.1 peers happy; newer peers downgrade to it.
pub fn build_greeting() -> Bytes {
    let mut b = BytesMut::with_capacity(GREETING_SIZE);

    // Signature
    b.put_u8(SIGNATURE_HEAD);
    b.put_bytes(0, 8);
    b.put_u8(SIGNATURE_TAIL);

    // Version 3.0
    b.put_u8(3);
    b.put_u8(0);

    // Mechanism: NULL, null-padded to 20 bytes
    b.extend_from_slice(b"NULL");
    b.put_bytes(0, 16);

    // As-server flag is always 0 for NULL
    b.put_u8(0);

    b.put_bytes(0, 31);

    b.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn our_greeting_parses() {
        let g = build_greeting();
        assert_eq!(g.len(), GREETING_SIZE);

        let parsed = ZmtpGreeting::parse(&g).unwrap();
        assert_eq!(parsed.major, 3);
        assert_eq!(parsed.minor, 0);
        assert_eq!(parsed.mechanism, MechanismName::Null);
        assert!(!parsed.as_server);
    }

    #[test]
    fn accepts_zmtp_3_1() {
        let mut g = build_greeting().to_vec();
        g[11] = 1;
        assert_eq!(ZmtpGreeting::parse(&g).unwrap().minor, 1);
    }

    #[test]
    fn rejects_zmtp_2() {
        let mut g = build_greeting().to_vec();
        g[10] = 2;
        assert!(matches!(
            ZmtpGreeting::parse(&g),
            Err(ZmtpError::InvalidGreeting(_))
        ));
    }

    #[test]
    fn rejects_bad_signature() {
        let mut g = build_greeting().to_vec();
        g[9] = 0;
        assert!(ZmtpGreeting::parse(&g).is_err());
        assert!(ZmtpGreeting::parse(&g[..10]).is_err());
    }

    #[test]
    fn reports_other_mechanisms() {
        let mut g = build_greeting().to_vec();
        g[12..17].copy_from_slice(b"CURVE");
        g[32] = 1;
        let parsed = ZmtpGreeting::parse(&g).unwrap();
        assert_eq!(parsed.mechanism, MechanismName::Curve);
        assert!(parsed.as_server);
    }
}
