use crate::input;

/// Types an entry macro can construct from the host request buffer.
pub trait FromRequest {
    fn from_request() -> Self;
}

impl FromRequest for String {
    fn from_request() -> Self {
        input::get_request_string()
    }
}

impl FromRequest for Vec<u8> {
    fn from_request() -> Self {
        input::get_request()
    }
}

/// Types an entry macro can construct from the host credential blob.
pub trait FromCredentials {
    fn from_credentials() -> Self;
}

impl FromCredentials for input::CredentialReader {
    fn from_credentials() -> Self {
        input::CredentialReader::new()
    }
}

impl FromCredentials for Vec<u8> {
    fn from_credentials() -> Self {
        use std::io::Read;
        let mut reader = input::CredentialReader::new();
        let mut out = Vec::with_capacity(reader.len() as usize);
        if reader.read_to_end(&mut out).is_err() {
            return Vec::new();
        }
        out
    }
}
