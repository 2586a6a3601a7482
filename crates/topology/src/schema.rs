//! [`ResourceSchema`] implementation for the `Topology` kind.

use reconcile::schema::json;
use reconcile::{DecodeError, EncodeError, ResourceSchema, ValidationError};

use crate::{validate, Topology};

/// JSON decoder, validator and encoder for [`Topology`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TopologySchema;

impl ResourceSchema for TopologySchema {
    type Resource = Topology;

    fn decode(&self, payload: &str) -> Result<Topology, DecodeError> {
        json::decode(payload)
    }

    fn validate(&self, resource: &Topology) -> Result<(), ValidationError> {
        validate::validate(resource)
    }

    fn encode(&self, resource: &Topology) -> Result<String, EncodeError> {
        json::encode(resource)
    }
}
