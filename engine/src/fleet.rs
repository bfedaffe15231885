//! Cooperating-group primitives.
//!
//! A processing call runs on every member of a group. Members agree on the
//! leader's decisions through a blocking broadcast: every member calls the
//! same collectives in the same order and each call returns only once the
//! root's payload is available. There is no timeout; a member that never
//! reaches a collective stalls the others.
//!
//! [`Solo`] is a group of one. [`ThreadGroup`] links members that run on
//! separate threads of one process, which is how the fleet tool and the
//! tests exercise multi-member agreement.

use std::cell::Cell;
use std::sync::Arc;

use clargs_core::{FleetError, Result};
use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Rank of the member whose decisions every other member adopts.
pub const LEADER: usize = 0;

/// A group of cooperating processes sharing one command line.
pub trait Collective {
    /// Position of this member in the group.
    fn rank(&self) -> usize;

    /// Number of members.
    fn size(&self) -> usize;

    fn is_leader(&self) -> bool {
        self.rank() == LEADER
    }

    /// Distributes `payload` from `root` to every member.
    ///
    /// The root passes `Some(bytes)`, all others pass `None`. Blocks until
    /// the root's bytes are available and returns them on every member.
    fn broadcast_bytes(
        &self,
        root: usize,
        payload: Option<Vec<u8>>,
    ) -> std::result::Result<Vec<u8>, FleetError>;

    /// Returns `true` on every member when `local` is `true` on any member.
    ///
    /// Each member broadcasts its flag in rank order.
    fn any(&self, local: bool) -> std::result::Result<bool, FleetError> {
        let mut found = false;
        for root in 0..self.size() {
            let payload = (root == self.rank()).then(|| vec![u8::from(local)]);
            let bytes = self.broadcast_bytes(root, payload)?;
            found |= bytes.first() == Some(&1);
        }
        Ok(found)
    }
}

/// Makes every member adopt the leader's value.
///
/// `leader_value` runs only on the leader. In a group of one no bytes are
/// exchanged.
///
/// # Errors
///
/// Returns [`ClargsError::Fleet`](clargs_core::ClargsError::Fleet) when the
/// broadcast fails and [`ClargsError::Payload`](clargs_core::ClargsError::Payload)
/// when the value does not round-trip through JSON.
pub fn agree<T, F>(group: &dyn Collective, leader_value: F) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> T,
{
    if group.size() == 1 {
        return Ok(leader_value());
    }
    let payload = if group.is_leader() {
        Some(serde_json::to_vec(&leader_value())?)
    } else {
        None
    };
    let bytes = group.broadcast_bytes(LEADER, payload)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn check_root(root: usize, size: usize) -> std::result::Result<(), FleetError> {
    if root >= size {
        return Err(FleetError::InvalidRoot { root, size });
    }
    Ok(())
}

/// A group with a single member, the leader.
#[derive(Debug, Clone, Copy, Default)]
pub struct Solo;

impl Collective for Solo {
    fn rank(&self) -> usize {
        LEADER
    }

    fn size(&self) -> usize {
        1
    }

    fn broadcast_bytes(
        &self,
        root: usize,
        payload: Option<Vec<u8>>,
    ) -> std::result::Result<Vec<u8>, FleetError> {
        check_root(root, 1)?;
        payload.ok_or(FleetError::MissingPayload { root })
    }
}

#[derive(Debug, Default)]
struct Slot {
    /// Sequence number of the most recent broadcast.
    seq: u64,
    payload: Vec<u8>,
    /// Members that have not yet read the current payload.
    unread: usize,
    departed: bool,
}

#[derive(Debug)]
struct Shared {
    size: usize,
    slot: Mutex<Slot>,
    changed: Condvar,
}

/// Factory for in-process groups whose members run on separate threads.
///
/// # Examples
///
/// ```
/// use clargs_engine::fleet::{Collective, ThreadGroup, agree};
///
/// let members = ThreadGroup::spawn_members(3);
/// let handles: Vec<_> = members
///     .into_iter()
///     .map(|member| {
///         std::thread::spawn(move || {
///             agree(&member, || format!("decided by rank {}", member.rank())).unwrap()
///         })
///     })
///     .collect();
/// for handle in handles {
///     assert_eq!(handle.join().unwrap(), "decided by rank 0");
/// }
/// ```
#[derive(Debug)]
pub struct ThreadGroup;

impl ThreadGroup {
    /// Creates the members of a group of `size`, ordered by rank.
    ///
    /// A size of zero is treated as one.
    pub fn spawn_members(size: usize) -> Vec<ThreadMember> {
        let size = size.max(1);
        let shared = Arc::new(Shared {
            size,
            slot: Mutex::new(Slot::default()),
            changed: Condvar::new(),
        });
        (0..size)
            .map(|rank| ThreadMember {
                rank,
                shared: Arc::clone(&shared),
                calls: Cell::new(0),
            })
            .collect()
    }
}

/// One member of a [`ThreadGroup`].
///
/// Dropping a member marks the group as disbanded so that peers blocked in
/// a collective the member will never join fail instead of hanging.
#[derive(Debug)]
pub struct ThreadMember {
    rank: usize,
    shared: Arc<Shared>,
    calls: Cell<u64>,
}

impl Collective for ThreadMember {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.shared.size
    }

    fn broadcast_bytes(
        &self,
        root: usize,
        payload: Option<Vec<u8>>,
    ) -> std::result::Result<Vec<u8>, FleetError> {
        check_root(root, self.shared.size)?;
        let call = self.calls.get() + 1;
        let mut slot = self.shared.slot.lock();

        if self.rank == root {
            let payload = payload.ok_or(FleetError::MissingPayload { root })?;
            while slot.unread > 0 {
                if slot.departed {
                    return Err(FleetError::Disbanded);
                }
                self.shared.changed.wait(&mut slot);
            }
            slot.seq = call;
            slot.payload.clone_from(&payload);
            slot.unread = self.shared.size - 1;
            self.calls.set(call);
            self.shared.changed.notify_all();
            Ok(payload)
        } else {
            if payload.is_some() {
                return Err(FleetError::UnexpectedPayload { rank: self.rank });
            }
            while slot.seq < call {
                if slot.departed {
                    return Err(FleetError::Disbanded);
                }
                self.shared.changed.wait(&mut slot);
            }
            let bytes = slot.payload.clone();
            slot.unread -= 1;
            self.calls.set(call);
            if slot.unread == 0 {
                self.shared.changed.notify_all();
            }
            Ok(bytes)
        }
    }
}

impl Drop for ThreadMember {
    fn drop(&mut self) {
        self.shared.slot.lock().departed = true;
        self.shared.changed.notify_all();
    }
}
