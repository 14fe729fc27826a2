pub fn hash_password(password: &str, cost: u32) -> anyhow::Result<String> {
    let password_hash = bcrypt::hash(password, cost)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;

    Ok(password_hash)
}

pub fn verify_password(password: &str, hash: &str) -> anyhow::Result<bool> {
    let matches = bcrypt::verify(password, hash)
        .map_err(|e| anyhow::anyhow!("Password verification error: {}", e))?;

    Ok(matches)
}
