use secrecy::Secret;

#[derive(Clone)]
pub struct JwtAccessSecret(pub Secret<String>);

#[derive(Clone)]
pub struct TokenExtractors {
    pub access: JwtAccessSecret,
    /// Marks the token cookie `Secure`; off for plain-http local runs.
    pub secure_cookies: bool,
}
