/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;

use bytes::{BufMut, BytesMut};

use crate::{SocksCredentialError, USER_AUTH_VERSION};

const USERNAME_MAX_LENGTH: usize = u8::MAX as usize;
const PASSWORD_MAX_LENGTH: usize = u8::MAX as usize;

/// Username and password for rfc1929 auth.
#[derive(Clone, PartialEq, Eq)]
pub struct Socks5Credentials {
    username: Vec<u8>,
    password: Vec<u8>,
}

impl Socks5Credentials {
    pub fn new<U, P>(username: U, password: P) -> Result<Self, SocksCredentialError>
    where
        U: Into<Vec<u8>>,
        P: Into<Vec<u8>>,
    {
        let username = username.into();
        if username.is_empty() {
            return Err(SocksCredentialError::EmptyUsername);
        }
        if username.len() > USERNAME_MAX_LENGTH {
            return Err(SocksCredentialError::UsernameTooLong(username.len()));
        }

        let password = password.into();
        if password.is_empty() {
            return Err(SocksCredentialError::EmptyPassword);
        }
        if password.len() > PASSWORD_MAX_LENGTH {
            return Err(SocksCredentialError::PasswordTooLong(password.len()));
        }

        Ok(Socks5Credentials { username, password })
    }

    #[inline]
    pub fn username(&self) -> &[u8] {
        &self.username
    }

    #[inline]
    pub fn password(&self) -> &[u8] {
        &self.password
    }

    /// Append the username/password request:
    ///
    /// +----+------+----------+------+----------+
    /// |VER | ULEN |  UNAME   | PLEN |  PASSWD  |
    /// +----+------+----------+------+----------+
    /// | 1  |  1   | 1 to 255 |  1   | 1 to 255 |
    /// +----+------+----------+------+----------+
    pub(crate) fn put_auth_request(&self, buf: &mut BytesMut) {
        buf.reserve(3 + self.username.len() + self.password.len());
        buf.put_u8(USER_AUTH_VERSION);
        // length fit in u8 as checked in new()
        buf.put_u8(self.username.len() as u8);
        buf.put_slice(&self.username);
        buf.put_u8(self.password.len() as u8);
        buf.put_slice(&self.password);
    }
}

impl fmt::Debug for Socks5Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Socks5Credentials")
            .field("username", &String::from_utf8_lossy(&self.username))
            .field("password", &"******")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_boundary() {
        let max = vec![b'a'; 255];
        let over = vec![b'a'; 256];

        assert!(Socks5Credentials::new("u", "p").is_ok());
        assert!(Socks5Credentials::new(max.clone(), max.clone()).is_ok());

        assert_eq!(
            Socks5Credentials::new("", "p").unwrap_err(),
            SocksCredentialError::EmptyUsername
        );
        assert_eq!(
            Socks5Credentials::new(over.clone(), "p").unwrap_err(),
            SocksCredentialError::UsernameTooLong(256)
        );
        assert_eq!(
            Socks5Credentials::new("u", "").unwrap_err(),
            SocksCredentialError::EmptyPassword
        );
        assert_eq!(
            Socks5Credentials::new("u", over).unwrap_err(),
            SocksCredentialError::PasswordTooLong(256)
        );
    }

    #[test]
    fn any_bytes() {
        let cred = Socks5Credentials::new(vec![0x00, 0xFF], vec![0x80]).unwrap();
        assert_eq!(cred.username(), &[0x00, 0xFF]);
        assert_eq!(cred.password(), &[0x80]);
    }

    #[test]
    fn auth_request() {
        let cred = Socks5Credentials::new("user", "pass").unwrap();
        let mut buf = BytesMut::new();
        cred.put_auth_request(&mut buf);
        assert_eq!(buf.as_ref(), b"\x01\x04user\x04pass");
    }

    #[test]
    fn debug_hides_password() {
        let cred = Socks5Credentials::new("user", "secret").unwrap();
        let s = format!("{cred:?}");
        assert!(s.contains("user"));
        assert!(!s.contains("secret"));
    }
}
