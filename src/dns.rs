//! DNS wire boundary: query parsing, response construction, id rewriting.
//!
//! Only the pieces the proxy needs are implemented here: the 12-byte
//! header, the question section, and enough response encoding to emit
//! a negative answer. Everything else in a packet is opaque bytes.

const HEADER_LEN: usize = 12;

/// NXDOMAIN response code.
pub const RCODE_NAME_ERROR: u8 = 3;

/// Normalize a domain name for cache and blocklist keys.
///
/// Lowercases and appends the trailing dot if absent, so the same
/// logical name never appears under two different keys. Idempotent.
pub fn normalize(name: &str) -> String {
    let mut name = name.to_lowercase();
    if !name.ends_with('.') {
        name.push('.');
    }
    name
}

/// A parsed DNS query.
#[derive(Debug, Clone)]
pub struct DnsQuery {
    pub id: u16,
    /// Question name, already normalized (lowercase, trailing dot).
    pub domain: String,
    pub qtype: u16,
    pub qclass: u16,
}

impl DnsQuery {
    /// Parse a DNS query from raw bytes.
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < HEADER_LEN + 1 {
            return None;
        }

        let id = u16::from_be_bytes([data[0], data[1]]);

        // Question name labels
        let mut pos = HEADER_LEN;
        let mut domain_parts = Vec::new();

        while pos < data.len() {
            let label_len = data[pos] as usize;
            if label_len == 0 {
                pos += 1;
                break;
            }
            pos += 1;
            if pos + label_len > data.len() {
                return None;
            }
            let label = std::str::from_utf8(&data[pos..pos + label_len]).ok()?;
            domain_parts.push(label.to_string());
            pos += label_len;
        }

        if domain_parts.is_empty() {
            return None;
        }

        if pos + 4 > data.len() {
            return None;
        }
        let qtype = u16::from_be_bytes([data[pos], data[pos + 1]]);
        let qclass = u16::from_be_bytes([data[pos + 2], data[pos + 3]]);

        let mut domain = domain_parts.join(".");
        domain.push('.');

        Some(Self {
            id,
            domain: normalize(&domain),
            qtype,
            qclass,
        })
    }

    /// Encode this query to wire format, for forwarding and tests.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(64);
        data.extend_from_slice(&self.id.to_be_bytes());
        data.extend_from_slice(&0x0100u16.to_be_bytes()); // RD
        data.extend_from_slice(&1u16.to_be_bytes()); // QDCOUNT
        data.extend_from_slice(&[0, 0, 0, 0, 0, 0]); // AN/NS/AR
        encode_domain(&mut data, &self.domain);
        data.extend_from_slice(&self.qtype.to_be_bytes());
        data.extend_from_slice(&self.qclass.to_be_bytes());
        data
    }

    /// Build the negative (NXDOMAIN) response for this query.
    ///
    /// Used both for blocked domains and for failed upstream forwards.
    pub fn negative_response(&self) -> DnsResponse {
        DnsResponse {
            id: self.id,
            // Response, recursion desired + available, rcode NameError
            flags: 0x8180 | RCODE_NAME_ERROR as u16,
            questions: vec![DnsQuestion {
                domain: self.domain.clone(),
                qtype: self.qtype,
                qclass: self.qclass,
            }],
            answers: Vec::new(),
        }
    }
}

/// A DNS response under construction.
#[derive(Debug, Clone)]
pub struct DnsResponse {
    pub id: u16,
    pub flags: u16,
    pub questions: Vec<DnsQuestion>,
    pub answers: Vec<DnsRecord>,
}

/// A DNS question section entry.
#[derive(Debug, Clone)]
pub struct DnsQuestion {
    pub domain: String,
    pub qtype: u16,
    pub qclass: u16,
}

/// A DNS resource record.
#[derive(Debug, Clone)]
pub struct DnsRecord {
    pub name: String,
    pub rtype: u16,
    pub class: u16,
    pub ttl: u32,
    pub rdata: Vec<u8>,
}

impl DnsResponse {
    /// Encode the response to wire format bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(512);

        data.extend_from_slice(&self.id.to_be_bytes());
        data.extend_from_slice(&self.flags.to_be_bytes());
        data.extend_from_slice(&(self.questions.len() as u16).to_be_bytes());
        data.extend_from_slice(&(self.answers.len() as u16).to_be_bytes());
        data.extend_from_slice(&[0x00, 0x00]); // NSCOUNT
        data.extend_from_slice(&[0x00, 0x00]); // ARCOUNT

        for q in &self.questions {
            encode_domain(&mut data, &q.domain);
            data.extend_from_slice(&q.qtype.to_be_bytes());
            data.extend_from_slice(&q.qclass.to_be_bytes());
        }

        for a in &self.answers {
            // Compression pointer when the answer names the question
            if !self.questions.is_empty() && a.name == self.questions[0].domain {
                data.extend_from_slice(&[0xC0, 0x0C]);
            } else {
                encode_domain(&mut data, &a.name);
            }
            data.extend_from_slice(&a.rtype.to_be_bytes());
            data.extend_from_slice(&a.class.to_be_bytes());
            data.extend_from_slice(&a.ttl.to_be_bytes());
            data.extend_from_slice(&(a.rdata.len() as u16).to_be_bytes());
            data.extend_from_slice(&a.rdata);
        }

        data
    }
}

fn encode_domain(buf: &mut Vec<u8>, domain: &str) {
    // Normalized names carry a trailing dot, which split produces as an
    // empty final label; skip it and emit the terminator ourselves.
    for label in domain.split('.').filter(|l| !l.is_empty()) {
        buf.push(label.len() as u8);
        buf.extend_from_slice(label.as_bytes());
    }
    buf.push(0);
}

/// Copy a wire-format message and patch in a new transaction id.
///
/// Responses handed to a client must echo that client's own id; a
/// cached or forwarded reply carries someone else's. Always copies, so
/// the source buffer (e.g. a cache entry) is never mutated.
pub fn rewrite_id(message: &[u8], id: u16) -> Option<Vec<u8>> {
    if message.len() < 2 {
        return None;
    }
    let mut copy = message.to_vec();
    copy[0] = (id >> 8) as u8;
    copy[1] = (id & 0xFF) as u8;
    Some(copy)
}

/// Extract the transaction id from a wire-format message.
pub fn message_id(message: &[u8]) -> Option<u16> {
    if message.len() < 2 {
        return None;
    }
    Some(u16::from_be_bytes([message[0], message[1]]))
}

/// Extract the response code from a wire-format message.
pub fn rcode(message: &[u8]) -> Option<u8> {
    if message.len() < HEADER_LEN {
        return None;
    }
    Some(message[3] & 0x0F)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_and_appends_dot() {
        assert_eq!(normalize("Example.Com"), "example.com.");
        assert_eq!(normalize("example.com."), "example.com.");
    }

    #[test]
    fn normalize_is_idempotent() {
        for name in ["Ads.Example.Com", "example.com.", "A"] {
            assert_eq!(normalize(&normalize(name)), normalize(name));
        }
    }

    #[test]
    fn parse_roundtrips_query() {
        let query = DnsQuery {
            id: 0xBEEF,
            domain: "example.com.".to_string(),
            qtype: 1,
            qclass: 1,
        };
        let parsed = DnsQuery::parse(&query.to_bytes()).unwrap();

        assert_eq!(parsed.id, 0xBEEF);
        assert_eq!(parsed.domain, "example.com.");
        assert_eq!(parsed.qtype, 1);
        assert_eq!(parsed.qclass, 1);
    }

    #[test]
    fn parse_normalizes_mixed_case() {
        let query = DnsQuery {
            id: 1,
            domain: "Ads.Example.Com.".to_string(),
            qtype: 1,
            qclass: 1,
        };
        let parsed = DnsQuery::parse(&query.to_bytes()).unwrap();

        assert_eq!(parsed.domain, "ads.example.com.");
    }

    #[test]
    fn parse_rejects_short_packet() {
        assert!(DnsQuery::parse(&[0u8; 12]).is_none());
        assert!(DnsQuery::parse(&[]).is_none());
    }

    #[test]
    fn negative_response_carries_nxdomain_and_query_id() {
        let query = DnsQuery {
            id: 0x1234,
            domain: "blocked.example.".to_string(),
            qtype: 1,
            qclass: 1,
        };
        let bytes = query.negative_response().to_bytes();

        assert_eq!(message_id(&bytes), Some(0x1234));
        assert_eq!(rcode(&bytes), Some(RCODE_NAME_ERROR));
    }

    #[test]
    fn rewrite_id_leaves_source_untouched() {
        let original = DnsQuery {
            id: 0x1111,
            domain: "example.com.".to_string(),
            qtype: 1,
            qclass: 1,
        }
        .to_bytes();

        let rewritten = rewrite_id(&original, 0x2222).unwrap();

        assert_eq!(message_id(&rewritten), Some(0x2222));
        assert_eq!(message_id(&original), Some(0x1111));
        assert_eq!(&rewritten[2..], &original[2..]);
    }
}
