use crate::codec::ZmtpError;
use crate::socket_type::SocketType;
use bytes::{BufMut, Bytes, BytesMut};

/// Largest PING context a peer may send (ZMTP 3.1).
pub const MAX_PING_CONTEXT: usize = 16;

/// Parsed ZMTP command (borrowed views into the frame body).
#[derive(Debug, Clone, Copy)]
pub struct ZmtpCommand<'a> {
    pub name: &'a [u8],
    /// Everything after the name; layout depends on the command.
    pub data: &'a [u8],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZmtpProp<'a> {
    pub name: &'a [u8],
    pub value: &'a [u8],
}

impl<'a> ZmtpCommand<'a> {
    #[inline]
    pub fn is(&self, lit: &[u8]) -> bool {
        self.name == lit
    }

    pub fn name_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.name).ok()
    }

    /// Decode `data` as a metadata property list (READY, INITIATE).
    ///
    /// Grammar: `[u8 name_len][name][u32 BE value_len][value]`, repeated.
    pub fn properties(&self) -> Result<Vec<ZmtpProp<'a>>, ZmtpError> {
        let b = self.data;
        let mut i = 0;
        let mut props = Vec::new();

        while i < b.len() {
            let pn_len = b[i] as usize;
            i += 1;

            if b.len() < i + pn_len {
                return Err(ZmtpError::Protocol("truncated property name"));
            }
            let name = &b[i..i + pn_len];
            i += pn_len;

            if b.len() < i + 4 {
                return Err(ZmtpError::Protocol("truncated property length"));
            }
            let vl = u32::from_be_bytes([b[i], b[i + 1], b[i + 2], b[i + 3]]) as usize;
            i += 4;

            if b.len() < i + vl {
                return Err(ZmtpError::Protocol("truncated property value"));
            }
            let value = &b[i..i + vl];
            i += vl;

            props.push(ZmtpProp { name, value });
        }

        Ok(props)
    }

    /// Context bytes of a PING (skipping the 2-byte TTL).
    pub fn ping_context(&self) -> Result<&'a [u8], ZmtpError> {
        if self.data.len() < 2 {
            return Err(ZmtpError::Protocol("PING without TTL"));
        }
        let context = &self.data[2..];
        if context.len() > MAX_PING_CONTEXT {
            return Err(ZmtpError::Protocol("PING context too long"));
        }
        Ok(context)
    }

    /// Reason text of an ERROR command.
    pub fn error_reason(&self) -> String {
        match self.data.split_first() {
            Some((&len, rest)) => {
                let len = (len as usize).min(rest.len());
                String::from_utf8_lossy(&rest[..len]).into_owned()
            }
            None => String::new(),
        }
    }
}

/// Split a command frame body into name and data.
pub fn parse_command(payload: &[u8]) -> Result<ZmtpCommand<'_>, ZmtpError> {
    let Some((&name_len, rest)) = payload.split_first() else {
        return Err(ZmtpError::Protocol("empty command"));
    };
    let name_len = name_len as usize;
    if rest.len() < name_len {
        return Err(ZmtpError::Protocol("truncated command name"));
    }
    let (name, data) = rest.split_at(name_len);
    Ok(ZmtpCommand { name, data })
}

/// Peer metadata carried by READY.
#[derive(Debug, Clone)]
pub struct ReadyMeta {
    pub socket_type: SocketType,
    pub identity: Option<Bytes>,
}

/// Extract READY metadata. `Socket-Type` is mandatory.
pub fn parse_ready(cmd: &ZmtpCommand<'_>) -> Result<ReadyMeta, ZmtpError> {
    if !cmd.is(b"READY") {
        return Err(ZmtpError::Protocol("expected READY"));
    }

    let mut socket_type = None;
    let mut identity = None;

    for prop in cmd.properties()? {
        // Property names are case-insensitive
        if prop.name.eq_ignore_ascii_case(b"Socket-Type") {
            socket_type = Some(SocketType::from_wire(prop.value)?);
        } else if prop.name.eq_ignore_ascii_case(b"Identity") && !prop.value.is_empty() {
            identity = Some(Bytes::copy_from_slice(prop.value));
        }
    }

    Ok(ReadyMeta {
        socket_type: socket_type.ok_or(ZmtpError::Protocol("READY without Socket-Type"))?,
        identity,
    })
}

fn put_name(dst: &mut BytesMut, name: &[u8]) {
    dst.put_u8(name.len() as u8);
    dst.extend_from_slice(name);
}

#[inline]
fn put_property(dst: &mut BytesMut, name: &str, value: &[u8]) {
    put_name(dst, name.as_bytes());
    dst.put_u32(value.len() as u32);
    dst.extend_from_slice(value);
}

/// Build a READY command body.
pub fn build_ready(socket_type: SocketType, identity: Option<&[u8]>) -> Bytes {
    let mut body = BytesMut::new();
    put_name(&mut body, b"READY");
    put_property(&mut body, "Socket-Type", socket_type.as_str().as_bytes());
    if let Some(id) = identity {
        put_property(&mut body, "Identity", id);
    }
    body.freeze()
}

/// Build a PING command body.
pub fn build_ping(ttl_deciseconds: u16, context: &[u8]) -> Bytes {
    let mut body = BytesMut::with_capacity(7 + context.len());
    put_name(&mut body, b"PING");
    body.put_u16(ttl_deciseconds);
    body.extend_from_slice(context);
    body.freeze()
}

/// Build a PONG command body echoing the PING context.
pub fn build_pong(context: &[u8]) -> Bytes {
    let mut body = BytesMut::with_capacity(5 + context.len());
    put_name(&mut body, b"PONG");
    body.extend_from_slice(context);
    body.freeze()
}
