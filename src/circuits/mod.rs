// src/circuits/mod.rs

//! Ordered sequences of `Operation`s and a builder for them.
//!
//! The signal transform assembles one of two fixed circuits with
//! `CircuitBuilder`; `Circuit`'s `Display` renders the wiring diagram shown by
//! `qrisk circuit`.

use crate::core::WireId;
use crate::operations::Operation;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// An ordered sequence of operations over a set of wires.
#[derive(Clone, PartialEq)]
pub struct Circuit {
    /// The unique set of wires touched by any operation.
    wires: HashSet<WireId>,

    /// Operations in application order.
    operations: Vec<Operation>,
}

impl Circuit {
    /// Creates a new, empty circuit.
    pub fn new() -> Self {
        Self {
            wires: HashSet::new(),
            operations: Vec::new(),
        }
    }

    /// Appends `op`, registering every wire it mentions.
    pub fn add_operation(&mut self, op: Operation) {
        for wire in op.involved_wires() {
            self.wires.insert(wire);
        }
        self.operations.push(op);
    }

    /// Appends every operation yielded by `ops`.
    pub fn add_operations<I>(&mut self, ops: I)
    where
        I: IntoIterator<Item = Operation>,
    {
        for op in ops {
            self.add_operation(op);
        }
    }

    /// Returns the set of unique wires involved in this circuit.
    pub fn wires(&self) -> &HashSet<WireId> {
        &self.wires
    }

    /// Returns the operations in application order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Returns the number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns `true` if the circuit contains no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl Default for Circuit {
    fn default() -> Self {
        Self::new()
    }
}

//-------------------------------------------------------------------------
// Circuit Builder
//-------------------------------------------------------------------------

/// Method-chaining helper for assembling a `Circuit`.
pub struct CircuitBuilder {
    circuit: Circuit,
}

impl CircuitBuilder {
    /// Creates a new, empty CircuitBuilder.
    pub fn new() -> Self {
        Self { circuit: Circuit::new() }
    }

    /// Adds a single operation to the circuit being built.
    pub fn add_op(mut self, op: Operation) -> Self {
        self.circuit.add_operation(op);
        self
    }

    /// Adds multiple operations to the circuit being built.
    pub fn add_ops<I>(mut self, ops: I) -> Self
    where
        I: IntoIterator<Item = Operation>,
    {
        self.circuit.add_operations(ops);
        self
    }

    /// Shorthand for `Operation::Rotate`.
    pub fn rotate(self, target: WireId, theta: f64) -> Self {
        self.add_op(Operation::Rotate { target, theta })
    }

    /// Shorthand for `Operation::ControlledFlip`.
    pub fn controlled_flip(self, control: WireId, target: WireId) -> Self {
        self.add_op(Operation::ControlledFlip { control, target })
    }

    /// Shorthand for `Operation::PhaseShift`.
    pub fn phase_shift(self, target: WireId, theta: f64) -> Self {
        self.add_op(Operation::PhaseShift { target, theta })
    }

    /// Shorthand for `Operation::Readout`.
    pub fn readout(self, targets: Vec<WireId>) -> Self {
        self.add_op(Operation::Readout { targets })
    }

    /// Finalizes the construction process and returns the built `Circuit`.
    pub fn build(self) -> Circuit {
        self.circuit
    }
}

impl Default for CircuitBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operations.is_empty() {
            return writeln!(f, "qrisk::Circuit[0 operations on 0 wires]");
        }

        let ops = &self.operations;
        let num_ops = ops.len();

        let mut sorted_wires: Vec<WireId> = self.wires.iter().cloned().collect();
        sorted_wires.sort();
        let num_wires = sorted_wires.len();
        let wire_to_row: HashMap<WireId, usize> =
            sorted_wires.iter().enumerate().map(|(i, w)| (*w, i)).collect();

        let max_label_width = sorted_wires.iter().map(|w| format!("{}", w).len()).max().unwrap_or(0);
        let label_padding = " ".repeat(max_label_width + 2);

        const GATE_WIDTH: usize = 7;
        const WIRE: &str = "───────";
        const V_WIRE: char = '│';
        const H_WIRE: char = '─';

        // op_grid[row][time] holds the gate or wire segment for that cell
        let mut op_grid: Vec<Vec<String>> = vec![vec![WIRE.to_string(); num_ops]; num_wires];
        // v_connect[row][time] holds the connector drawn below that row
        let mut v_connect: Vec<Vec<char>> = vec![vec![' '; num_ops]; num_wires];

        fn format_gate(symbol: &str) -> String {
            let slen = symbol.chars().count();
            if slen >= GATE_WIDTH {
                symbol.chars().take(GATE_WIDTH).collect()
            } else {
                let total_dashes = GATE_WIDTH - slen;
                let pre_dashes = total_dashes / 2;
                let post_dashes = total_dashes - pre_dashes;
                format!(
                    "{}{}{}",
                    H_WIRE.to_string().repeat(pre_dashes),
                    symbol,
                    H_WIRE.to_string().repeat(post_dashes)
                )
            }
        }

        for (t, op) in ops.iter().enumerate() {
            match op {
                Operation::Rotate { target, .. } => {
                    if let Some(r) = wire_to_row.get(target) {
                        op_grid[*r][t] = format_gate("RY");
                    }
                }
                Operation::PhaseShift { target, .. } => {
                    if let Some(r) = wire_to_row.get(target) {
                        op_grid[*r][t] = format_gate("P");
                    }
                }
                Operation::ControlledFlip { control, target } => {
                    if let (Some(r_ctrl), Some(r_tgt)) = (wire_to_row.get(control), wire_to_row.get(target)) {
                        op_grid[*r_ctrl][t] = format_gate("@");
                        op_grid[*r_tgt][t] = format_gate("X");

                        let r_min = (*r_ctrl).min(*r_tgt);
                        let r_max = (*r_ctrl).max(*r_tgt);
                        for row_vec in v_connect.iter_mut().take(r_max).skip(r_min) {
                            row_vec[t] = V_WIRE;
                        }
                    }
                }
                Operation::Readout { targets } => {
                    for target in targets {
                        if let Some(r) = wire_to_row.get(target) {
                            op_grid[*r][t] = format_gate("M");
                        }
                    }
                }
            }
        }

        writeln!(f, "qrisk::Circuit[{} operations on {} wires]", num_ops, num_wires)?;
        for r in 0..num_wires {
            let label = format!("{}: ", sorted_wires[r]);
            write!(f, "{:<width$}", label, width = max_label_width + 2)?;
            writeln!(f, "{}", op_grid[r].join(""))?;

            if r < num_wires - 1 {
                write!(f, "{}", label_padding)?;
                for t in 0..num_ops {
                    let connector = v_connect[r][t];
                    let padding_needed = GATE_WIDTH.saturating_sub(1);
                    let pre_pad = padding_needed / 2;
                    let post_pad = padding_needed - pre_pad;
                    write!(f, "{}{}{}", " ".repeat(pre_pad), connector, " ".repeat(post_pad))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
