use digest::Digest;

/// Incremental hashing over streamed chunks.
pub trait Hasher: Send {
    fn update(&mut self, data: &[u8]);
    fn finalize(self) -> Vec<u8>;
}

/// Any RustCrypto [`Digest`] as a [`Hasher`].
#[derive(Debug, Clone, Default)]
pub struct DigestHasher<D>(D);

impl<D: Digest> DigestHasher<D> {
    pub fn new() -> Self { Self(D::new()) }

    /// One-shot digest of `data`.
    pub fn digest(data: &[u8]) -> Vec<u8> { D::digest(data).to_vec() }
}

impl<D: Digest + Send> Hasher for DigestHasher<D> {
    fn update(&mut self, data: &[u8]) { Digest::update(&mut self.0, data); }
    fn finalize(self) -> Vec<u8> { Digest::finalize(self.0).to_vec() }
}

pub type Md5Hasher = DigestHasher<md5::Md5>;

pub type Sha256Hasher = DigestHasher<sha2::Sha256>;

/// A hasher for whichever [`HashAlgorithm`](crate::HashAlgorithm) was configured.
#[derive(Debug, Clone)]
pub enum AnyHasher {
    Md5(Md5Hasher),
    Sha256(Sha256Hasher),
}

impl Hasher for AnyHasher {
    fn update(&mut self, data: &[u8]) {
        match self {
            AnyHasher::Md5(h) => h.update(data),
            AnyHasher::Sha256(h) => h.update(data),
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            AnyHasher::Md5(h) => h.finalize(),
            AnyHasher::Sha256(h) => h.finalize(),
        }
    }
}
