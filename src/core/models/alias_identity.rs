/// The shared pseudo-account staff members may post and edit as.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AliasIdentity {
    pub id: u64,
    pub username: String,
}

impl std::fmt::Display for AliasIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (#{})", self.username, self.id)
    }
}
