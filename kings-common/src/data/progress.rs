// kings-common/src/data/progress.rs
// State-to-state progress of a single token

use super::types::StateRecord;

/// Counter differences between a state and the state reached before it
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StateDelta {
    pub buy_count: i64,
    pub sell_count: i64,
    pub tx_count: i64,
    pub total_sol_volume: f64,
    pub buy_volume: f64,
    pub sell_volume: f64,
    pub real_sol_reserves: f64,
    pub maker_count: i64,
    pub holder_count: i64,
}

impl StateDelta {
    pub fn between(previous: &StateRecord, current: &StateRecord) -> Self {
        Self {
            buy_count: signed_diff(current.buy_count, previous.buy_count),
            sell_count: signed_diff(current.sell_count, previous.sell_count),
            tx_count: signed_diff(current.tx_count, previous.tx_count),
            total_sol_volume: current.total_sol_volume - previous.total_sol_volume,
            buy_volume: current.buy_volume - previous.buy_volume,
            sell_volume: current.sell_volume - previous.sell_volume,
            real_sol_reserves: current.real_sol_reserves - previous.real_sol_reserves,
            maker_count: signed_diff(current.maker_count, previous.maker_count),
            holder_count: signed_diff(current.holder_count, previous.holder_count),
        }
    }
}

/// One step of a token's progress: the record plus its delta, if any
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressStep<'a> {
    pub record: &'a StateRecord,
    pub delta: Option<StateDelta>,
    pub stalled: bool,
}

fn signed_diff(current: u64, previous: u64) -> i64 {
    current as i64 - previous as i64
}

/// Pairs every state with its delta against the previous one.
/// The first state has no delta.
pub fn state_deltas(states: &[StateRecord]) -> Vec<Option<StateDelta>> {
    states
        .iter()
        .enumerate()
        .map(|(i, current)| {
            if i == 0 {
                None
            } else {
                Some(StateDelta::between(&states[i - 1], current))
            }
        })
        .collect()
}

/// Indices of states whose `tx_count` did not move compared to a neighbour.
///
/// Identical transaction counts across two checkpoints usually mean the
/// indexer replayed a snapshot or the token is being botted.
pub fn stalled_states(states: &[StateRecord]) -> Vec<usize> {
    (0..states.len())
        .filter(|&i| is_stalled(states, i))
        .collect()
}

fn is_stalled(states: &[StateRecord], i: usize) -> bool {
    let tx = states[i].tx_count;
    let prev = i.checked_sub(1).and_then(|p| states.get(p));
    let next = states.get(i + 1);
    prev.map_or(false, |p| p.tx_count == tx) || next.map_or(false, |n| n.tx_count == tx)
}

/// Progress view used by the state modal and the training page
pub fn progress_steps(states: &[StateRecord]) -> Vec<ProgressStep<'_>> {
    let deltas = state_deltas(states);
    states
        .iter()
        .zip(deltas)
        .enumerate()
        .map(|(i, (record, delta))| ProgressStep {
            record,
            delta,
            stalled: is_stalled(states, i),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(state: i64, tx: u64, holders: u64, volume: f64) -> StateRecord {
        StateRecord {
            state,
            tx_count: tx,
            holder_count: holders,
            total_sol_volume: volume,
            ..Default::default()
        }
    }

    #[test]
    fn test_first_state_has_no_delta() {
        let states = vec![record(10, 5, 3, 1.0), record(20, 12, 2, 4.5)];
        let deltas = state_deltas(&states);

        assert_eq!(deltas.len(), 2);
        assert!(deltas[0].is_none());

        let delta = deltas[1].unwrap();
        assert_eq!(delta.tx_count, 7);
        assert_eq!(delta.holder_count, -1);
        assert_eq!(delta.total_sol_volume, 3.5);
    }

    #[test]
    fn test_stalled_states_flag_both_neighbours() {
        let states = vec![
            record(10, 5, 1, 0.0),
            record(20, 9, 1, 0.0),
            record(30, 9, 1, 0.0),
            record(40, 15, 1, 0.0),
        ];
        assert_eq!(stalled_states(&states), vec![1, 2]);
    }

    #[test]
    fn test_progress_steps_on_empty_history() {
        assert!(progress_steps(&[]).is_empty());
        assert!(stalled_states(&[]).is_empty());
    }
}
