use super::errors::*;
use anyhow::Context;
use argon2::{hash_encoded, verify_encoded};
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use secrecy::{ExposeSecret, SecretString};

pub fn hash_pass(pass: &SecretString) -> Result<String, AuthError> {
    Ok(hash_encoded(
        pass.expose_secret().as_bytes(),
        random_salt().as_bytes(),
        &argon2::Config::default(),
    )
    .context("Failed to hash pass")?)
}

pub fn verify_pass(hash: &str, pass: &SecretString) -> Result<bool, AuthError> {
    Ok(verify_encoded(hash, pass.expose_secret().as_bytes())
        .context("Failed to verify password")?)
}

pub fn random_salt() -> String {
    let mut rng = thread_rng();
    (0..16).map(|_| rng.sample(Alphanumeric) as char).collect()
}

pub fn pass_is_strong(user_password: &str, user_inputs: &[&str]) -> bool {
    let score = zxcvbn::zxcvbn(user_password, user_inputs);
    match score {
        Ok(s) => s.score() >= 3,
        Err(_) => false,
    }
}
