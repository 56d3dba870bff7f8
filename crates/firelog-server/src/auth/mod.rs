pub mod extractor;
pub mod gotrue;
// Public so integration and e2e test binaries can run on `InMemoryAuthProvider`.
pub mod mock;
pub mod provider;
pub mod token;
