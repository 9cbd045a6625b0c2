//! The builtin tag vocabulary and session prototypes.
//!
//! These are the well-known expressions every peer must derive identically;
//! the statics below are the single authority for their spelling. Hosts call
//! [`bootstrap`] to obtain a sealed registry pre-loaded with the standard
//! session prototypes.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::TagError;
use crate::expr::TagSpec;
use crate::id::TagId;
use crate::registry::TagRegistry;
use crate::{Prototype, TagExpr};

/// Hardwired identifier of the meta node; reserved, never derivable from an
/// expression in practice and never registrable.
pub const META_NODE_ID: TagId = TagId::from_ints(0, 0, 2701);

/// Root of the builtin vocabulary.
pub static TAG_ROOT: LazyLock<TagSpec> = LazyLock::new(|| TagExpr::from_expr("amp"));

/// Attribute namespace: `amp.attr`.
pub static ATTR_SPEC: LazyLock<TagSpec> = LazyLock::new(|| TAG_ROOT.with("attr"));

/// Application namespace: `amp.app`.
pub static APP_SPEC: LazyLock<TagSpec> = LazyLock::new(|| TAG_ROOT.with("app"));

/// Attribute whose elements are child node identifiers.
pub static CELL_CHILDREN: LazyLock<TagSpec> =
    LazyLock::new(|| ATTR_SPEC.with("children.TagID"));

/// Attribute carrying a node's property manifest.
pub static CELL_PROPERTIES: LazyLock<TagSpec> =
    LazyLock::new(|| ATTR_SPEC.with("cell-properties"));

/// Root of the per-cell property vocabulary.
pub static PROPERTY: LazyLock<TagSpec> = LazyLock::new(|| TagExpr::from_expr("cell-property"));

pub static GLYPHS: LazyLock<TagSpec> = LazyLock::new(|| PROPERTY.with("Tags.glyphs"));
pub static LINKS: LazyLock<TagSpec> = LazyLock::new(|| PROPERTY.with("Tags.links"));

pub static CELL_MEDIA: LazyLock<TagSpec> = LazyLock::new(|| PROPERTY.with("Tag.content.media"));
pub static CELL_COVER: LazyLock<TagSpec> = LazyLock::new(|| PROPERTY.with("Tag.content.cover"));
pub static CELL_VIS: LazyLock<TagSpec> = LazyLock::new(|| PROPERTY.with("Tag.content.vis"));

pub static TEXT_TAG: LazyLock<TagSpec> = LazyLock::new(|| PROPERTY.with("Tag.text"));
pub static CELL_LABEL: LazyLock<TagSpec> = LazyLock::new(|| TEXT_TAG.with("label"));
pub static CELL_CAPTION: LazyLock<TagSpec> = LazyLock::new(|| TEXT_TAG.with("caption"));
pub static CELL_COLLECTION: LazyLock<TagSpec> = LazyLock::new(|| TEXT_TAG.with("collection"));

/// Session namespace the builtin prototypes register under.
pub static SESSION_ATTR: LazyLock<TagSpec> = LazyLock::new(|| TagExpr::from_expr("session"));

/// An error conveyed to the peer: `session.err`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Prototype)]
#[tag(prefix = "session")]
pub struct Err {
    pub code: String,
    pub msg: String,
}

/// A bare tag payload: `session.tag`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Prototype)]
#[tag(prefix = "session")]
pub struct Tag {
    pub id: TagId,
}

/// Login intent opening an auth handshake: `session.login`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Prototype)]
#[tag(prefix = "session")]
pub struct Login {
    pub user_uid: String,
    pub member_epoch: TagId,
}

/// Host-issued challenge: `session.loginchallenge`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Prototype)]
#[tag(prefix = "session")]
pub struct LoginChallenge {
    pub hash: Vec<u8>,
}

/// Client proof answering a challenge: `session.loginresponse`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Prototype)]
#[tag(prefix = "session")]
pub struct LoginResponse {
    pub hash_resp: Vec<u8>,
}

/// Resumable auth checkpoint: `session.logincheckpoint`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Prototype)]
#[tag(prefix = "session")]
pub struct LoginCheckpoint {
    pub uri: String,
    pub session_token: String,
}

/// Out-of-band PIN round trip: `session.pinrequest`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Prototype)]
#[tag(prefix = "session")]
pub struct PinRequest {
    pub payload: Vec<u8>,
    pub pin: String,
}

/// Host instruction to open a URL: `session.launchurl`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Prototype)]
#[tag(prefix = "session")]
pub struct LaunchUrl {
    pub url: String,
}

/// Builds and seals a registry holding the standard session prototypes.
///
/// Registration order is fixed; since conflicts are errors this only matters
/// for iteration order, but keeping it stable makes host diffs meaningful.
pub fn bootstrap() -> Result<TagRegistry, TagError> {
    let mut reg = TagRegistry::new();
    reg.register_prototype::<Err>()?;
    reg.register_prototype::<Tag>()?;
    reg.register_prototype::<Login>()?;
    reg.register_prototype::<LoginChallenge>()?;
    reg.register_prototype::<LoginResponse>()?;
    reg.register_prototype::<LoginCheckpoint>()?;
    reg.register_prototype::<PinRequest>()?;
    reg.register_prototype::<LaunchUrl>()?;
    reg.seal();
    Ok(reg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_prototype_paths() {
        assert_eq!(Err::tag_expr().canonic(), "session.err");
        assert_eq!(Tag::tag_expr().canonic(), "session.tag");
        assert_eq!(Login::tag_expr().canonic(), "session.login");
        assert_eq!(
            LoginChallenge::tag_expr().canonic(),
            "session.loginchallenge"
        );
        assert_eq!(LoginResponse::tag_expr().canonic(), "session.loginresponse");
        assert_eq!(
            LoginCheckpoint::tag_expr().canonic(),
            "session.logincheckpoint"
        );
        assert_eq!(PinRequest::tag_expr().canonic(), "session.pinrequest");
        assert_eq!(LaunchUrl::tag_expr().canonic(), "session.launchurl");
    }

    #[test]
    fn bootstrap_is_sealed_and_complete() {
        let reg = bootstrap().unwrap();
        assert!(reg.is_sealed());
        assert_eq!(reg.len(), 8);
        assert!(reg.contains_id(Login::tag_expr().id()));
        assert!(reg.contains_id(LaunchUrl::tag_expr().id()));
    }

    #[test]
    fn vocabulary_shares_prefixes() {
        assert_eq!(CELL_LABEL.canonic(), "cell-property.tag.text.label");
        assert_eq!(CELL_CAPTION.canonic(), "cell-property.tag.text.caption");
        assert_eq!(
            CELL_COLLECTION.canonic(),
            "cell-property.tag.text.collection"
        );
        assert_eq!(TEXT_TAG.canonic(), "cell-property.tag.text");
        assert_eq!(CELL_CHILDREN.canonic(), "amp.attr.children.tagid");
    }

    #[test]
    fn meta_node_id_is_reserved() {
        assert!(META_NODE_ID.is_set());
        assert_eq!(META_NODE_ID, TagId::from_ints(0, 0, 2701));
    }
}
