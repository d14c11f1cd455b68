//! Change notifications
//!
//! The table publishes one event per state change through plain mpsc
//! channels: observers call [`crate::table::DataTable::subscribe`] and
//! receive every subsequent event. Events that invalidate positional
//! caches ([`TableEvent::ColumnOrderChanged`]) are distinct from selection
//! and statistics events so observers rebuild those caches only when
//! needed.

use serde::{Deserialize, Serialize};
use std::sync::mpsc::{channel, Receiver, Sender};

use crate::column::ColumnId;

/// Events emitted by a table when its state changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TableEvent {
    /// The column and tuple sets were replaced wholesale
    DataReset,

    /// A column rejoined the active view
    ColumnEnabled(ColumnId),

    /// A column left the active view
    ColumnDisabled(ColumnId),

    /// Several columns left the active view at once (multicollinearity
    /// filter)
    ColumnsDisabled(Vec<ColumnId>),

    /// The canonical column order changed; positional caches are invalid
    ColumnOrderChanged,

    /// A column was renamed
    ColumnRenamed { id: ColumnId, name: String },

    /// A quantitative column's discrete flag changed
    ColumnDiscreteChanged { id: ColumnId, discrete: bool },

    /// The highlighted column changed (None = cleared)
    HighlightChanged(Option<ColumnId>),

    /// The time column changed (None = cleared)
    TimeColumnChanged(Option<ColumnId>),

    /// A selection range was added to a column
    SelectionAdded { column: ColumnId },

    /// A selection range was removed from a column
    SelectionRemoved { column: ColumnId },

    /// Every column reverted to unselected
    QueryCleared,

    /// Rows were appended
    TuplesAdded(usize),

    /// Rows were deleted
    TuplesRemoved(usize),

    /// Statistics were recomputed (fired after the specific event of the
    /// mutation that caused the recompute)
    StatisticsChanged,
}

/// Fan-out of table events to any number of subscribers
#[derive(Debug, Default)]
pub(crate) struct EventBus {
    senders: Vec<Sender<TableEvent>>,
}

impl EventBus {
    /// Register a new observer
    pub(crate) fn subscribe(&mut self) -> Receiver<TableEvent> {
        let (tx, rx) = channel();
        self.senders.push(tx);
        rx
    }

    /// Deliver an event to every live observer, pruning dead ones
    pub(crate) fn emit(&mut self, event: TableEvent) {
        tracing::trace!(?event, "emitting table event");
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_subscribers_receive_events() {
        let mut bus = EventBus::default();
        let rx1 = bus.subscribe();
        let rx2 = bus.subscribe();

        bus.emit(TableEvent::DataReset);

        assert_eq!(rx1.try_recv().unwrap(), TableEvent::DataReset);
        assert_eq!(rx2.try_recv().unwrap(), TableEvent::DataReset);
    }

    #[test]
    fn test_dead_subscribers_are_pruned() {
        let mut bus = EventBus::default();
        let rx = bus.subscribe();
        drop(rx);

        bus.emit(TableEvent::StatisticsChanged);
        assert!(bus.senders.is_empty());
    }

    #[test]
    fn test_event_serde_round_trip() {
        let events = vec![
            TableEvent::DataReset,
            TableEvent::ColumnDisabled(Uuid::new_v4()),
            TableEvent::ColumnsDisabled(vec![Uuid::new_v4(), Uuid::new_v4()]),
            TableEvent::ColumnRenamed {
                id: Uuid::new_v4(),
                name: "velocity".to_string(),
            },
            TableEvent::HighlightChanged(None),
            TableEvent::TuplesRemoved(7),
        ];
        for event in &events {
            let json = serde_json::to_string(event).unwrap();
            let back: TableEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(*event, back);
        }
    }
}
