mod headers;

pub use self::headers::parse_headers;
