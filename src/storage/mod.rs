//! Vector store access

pub mod pinecone;


pub use pinecone::{PineconeVectorStore, RetrievedDocument, VectorStoreClient};
