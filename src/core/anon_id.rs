use rand::Rng;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Width of the `anon_id_*` columns
pub const MAX_ANON_ID_LEN: usize = 20;

/// Generates display labels that stand in for a user's identity in a pairing
///
/// Labels are `prefix` followed by `length` uppercase letters or digits.
/// They are not secrets and uniqueness across pairings is not enforced.
#[derive(Debug, Clone)]
pub struct AnonIdGenerator {
    prefix: String,
    length: usize,
}

impl AnonIdGenerator {
    pub fn new(prefix: impl Into<String>, length: usize) -> Self {
        Self {
            prefix: prefix.into(),
            length,
        }
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let mut id = String::with_capacity(self.prefix.len() + self.length);
        id.push_str(&self.prefix);
        id.extend((0..self.length).map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char));
        id
    }

    /// One independent label per side of a pairing
    pub fn generate_pair<R: Rng + ?Sized>(&self, rng: &mut R) -> (String, String) {
        (self.generate(rng), self.generate(rng))
    }
}

impl Default for AnonIdGenerator {
    fn default() -> Self {
        Self::new("User", 8)
    }
}
