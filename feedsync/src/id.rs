use nanoid::nanoid;

/// Canonical alphabet for feedsync entity identifiers (no ambiguous glyphs).
const ENTITY_ID_ALPHABET: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y',
    'Z', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'j', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];
/// Default entity id length.
const ENTITY_ID_LENGTH: usize = 20;
/// Random suffix length for comment ids.
const COMMENT_ID_SUFFIX_LENGTH: usize = 8;

/// Generates a new entity identifier using the configured alphabet and length.
pub fn generate_entity_id() -> String {
    nanoid!(ENTITY_ID_LENGTH, ENTITY_ID_ALPHABET)
}

/// Generates a comment identifier: base36 of the creation time in
/// milliseconds plus a random suffix. Collision-resistant within one
/// post's lifetime; global uniqueness is not required because comments
/// only exist embedded in their parent post.
pub fn generate_comment_id(now_millis: i64) -> String {
    let mut id = to_base36(now_millis.max(0) as u64);
    id.push('-');
    id.push_str(&nanoid!(COMMENT_ID_SUFFIX_LENGTH, ENTITY_ID_ALPHABET));
    id
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).expect("base36 digits are ascii")
}
