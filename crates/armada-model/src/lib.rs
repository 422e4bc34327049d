// crates/armada-model/src/lib.rs
// ============================================================================
// Module: Armada Model Library
// Description: Public API surface for the Armada deployment model contracts.
// Purpose: Expose typed paths, item states, properties, and plan documents.
// Dependencies: crate::{item, mac, path, plan, props}
// ============================================================================

//! ## Overview
//! Armada Model defines the typed vocabulary shared by everything that talks
//! to an Armada deployment manager: model paths, item types and states,
//! property bags, MAC addresses, and the plan document returned by the model
//! query service. The types are transport-agnostic wrappers over the wire
//! forms Armada emits; all validation happens at construction so downstream
//! code can rely on canonical values.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod item;
pub mod mac;
pub mod path;
pub mod plan;
pub mod props;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use item::ItemState;
pub use item::ItemStateParseError;
pub use item::ItemType;
pub use item::ItemTypeError;
pub use item::ModelItem;
pub use mac::MacAddr;
pub use mac::MacError;
pub use mac::MacPrefix;
pub use path::ModelPath;
pub use path::PathError;
pub use plan::PlanDocument;
pub use plan::PlanPhase;
pub use plan::PlanState;
pub use plan::PlanStateParseError;
pub use plan::PlanTask;
pub use plan::TaskState;
pub use plan::TaskStateParseError;
pub use props::Properties;
pub use props::PropertyError;
