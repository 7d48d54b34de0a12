//! Connection engine: decides which edge requests are accepted, rejected,
//! or transformed.
//!
//! Rules apply in order, first match wins:
//! 1. The exact opposite direction is already connected -> the user is
//!    flipping the edge: remove the reverse edge, add the requested one
//!    (unless the flipped edge would land on an occupied input, which is
//!    rejected like rule 3).
//! 2. The same (source, target) pair is already connected (handles ignored)
//!    -> silently ignore; parallel edges between one pair are never useful.
//! 3. The requested (target, target_handle) is occupied -> reject with a
//!    user-visible warning; an input handle accepts exactly one producer.
//! 4. Otherwise append the edge.
//!
//! Rule 1 must run before 2 and 3 so a legitimate direction flip is not
//! mistaken for a duplicate or an occupied input.

use crate::edge::{ConnectRequest, EdgeRef};
use crate::graph::WorkflowGraph;
use flowboard_core::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};

/// The result of a connection request.
///
/// Only `Connected` and `Reversed` mutate the graph. `InputOccupied` is the
/// one rejection the editor surfaces to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ConnectOutcome {
    /// The requested edge was added.
    Connected { edge: EdgeRef },
    /// The reverse edge existed; it was removed and the requested edge added.
    Reversed { removed: EdgeId, edge: EdgeRef },
    /// An edge between this node pair already exists; nothing changed.
    DuplicateIgnored,
    /// The target input handle already has a producer; nothing changed.
    InputOccupied { existing: EdgeRef },
    /// One of the endpoints is not in the graph; nothing changed.
    UnknownEndpoint { node_id: NodeId },
}

impl ConnectOutcome {
    /// Returns true if the request mutated the graph.
    #[must_use]
    pub const fn changed(&self) -> bool {
        matches!(self, Self::Connected { .. } | Self::Reversed { .. })
    }
}

impl WorkflowGraph {
    /// Applies a connection request through the rules above.
    pub fn connect(&mut self, request: ConnectRequest) -> ConnectOutcome {
        for &endpoint in [&request.source, &request.target] {
            if !self.contains(endpoint) {
                return ConnectOutcome::UnknownEndpoint { node_id: endpoint };
            }
        }

        let reverse = self
            .outgoing_edges(request.target)
            .into_iter()
            .find(|e| e.target == request.source);
        if let Some(reverse) = reverse {
            // A flip still lands on an input handle; if some third edge
            // already feeds it, rejecting keeps the single-producer
            // invariant and avoids a half-applied flip.
            if let Some(existing) =
                self.input_occupant(request.target, request.target_handle.as_deref())
            {
                tracing::warn!(
                    target = %request.target,
                    occupant = %existing.source,
                    "cannot reverse onto an occupied input handle"
                );
                return ConnectOutcome::InputOccupied { existing };
            }
            self.remove_edges_where(|e| e.id == reverse.id);
            let edge = self.add_edge_unchecked(&request);
            tracing::debug!(
                source = %request.source,
                target = %request.target,
                removed = %reverse.id,
                "reversed existing connection"
            );
            return ConnectOutcome::Reversed {
                removed: reverse.id,
                edge,
            };
        }

        let duplicate = self
            .outgoing_edges(request.source)
            .into_iter()
            .any(|e| e.target == request.target);
        if duplicate {
            tracing::debug!(
                source = %request.source,
                target = %request.target,
                "ignoring duplicate connection"
            );
            return ConnectOutcome::DuplicateIgnored;
        }

        if let Some(existing) = self.input_occupant(request.target, request.target_handle.as_deref())
        {
            tracing::warn!(
                target = %request.target,
                target_handle = request.target_handle.as_deref().unwrap_or("<default>"),
                occupant = %existing.source,
                "input handle already has a producer"
            );
            return ConnectOutcome::InputOccupied { existing };
        }

        let edge = self.add_edge_unchecked(&request);
        ConnectOutcome::Connected { edge }
    }
}
