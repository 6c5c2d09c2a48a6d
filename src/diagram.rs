//! Mermaid export of the transition graph.

use crate::machine::machine::Machine;
use crate::machine::transition::Transition;
use std::fmt::Write as _;

impl Machine {
    /// Render the transition graph as a Mermaid `stateDiagram-v2` document.
    ///
    /// Output is deterministic for a given definition order: wildcard
    /// transitions come first under the `AnyState` pseudo-source, then each
    /// state's transitions in state-creation order. A dynamic target has no
    /// static name, so the line falls back to the transition's own name, or
    /// `AnyState` when it has none.
    ///
    /// # Example
    ///
    /// ```rust
    /// use flywheel::{Machine, MachineState};
    ///
    /// #[derive(Default)]
    /// struct Idle;
    /// impl MachineState for Idle {
    ///     fn auto_create() -> Option<Self> { Some(Self::default()) }
    /// }
    ///
    /// #[derive(Default)]
    /// struct Walk;
    /// impl MachineState for Walk {
    ///     fn auto_create() -> Option<Self> { Some(Self::default()) }
    /// }
    ///
    /// let mut machine = Machine::new();
    /// machine.from::<Idle>().to::<Walk>().build()?;
    /// machine.from::<Walk>().to_previous().named("back").build()?;
    /// assert_eq!(
    ///     machine.diagram(),
    ///     "stateDiagram-v2\n    Idle --> Walk\n    Walk --> back\n"
    /// );
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn diagram(&self) -> String {
        let mut out = String::from("stateDiagram-v2\n");
        for transition in &self.any_transitions {
            edge(&mut out, "AnyState", transition);
        }
        for entry in self.factory.ordered() {
            for transition in &entry.transitions {
                edge(&mut out, entry.name, transition);
            }
        }
        out
    }
}

fn edge(out: &mut String, source: &str, transition: &Transition) {
    let target = match transition.target_name {
        Some(name) => name,
        None => transition.name.as_deref().unwrap_or("AnyState"),
    };
    let _ = writeln!(out, "    {source} --> {target}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MachineState, StateId};

    #[derive(Default)]
    struct Idle;
    impl MachineState for Idle {
        fn auto_create() -> Option<Self> {
            Some(Self::default())
        }
    }

    #[derive(Default)]
    struct Walk;
    impl MachineState for Walk {
        fn auto_create() -> Option<Self> {
            Some(Self::default())
        }
    }

    #[derive(Default)]
    struct Stunned;
    impl MachineState for Stunned {
        fn auto_create() -> Option<Self> {
            Some(Self::default())
        }
    }

    #[test]
    fn empty_machine_renders_only_the_header() {
        let machine = Machine::new();
        assert_eq!(machine.diagram(), "stateDiagram-v2\n");
    }

    #[test]
    fn wildcard_edges_come_first_then_creation_order() {
        let mut machine = Machine::new();
        machine.from::<Idle>().to::<Walk>().build().unwrap();
        machine.from::<Walk>().to::<Idle>().build().unwrap();
        machine.from_any().to::<Stunned>().build().unwrap();

        assert_eq!(
            machine.diagram(),
            "stateDiagram-v2\n\
             \x20   AnyState --> Stunned\n\
             \x20   Idle --> Walk\n\
             \x20   Walk --> Idle\n"
        );
    }

    #[test]
    fn dynamic_targets_fall_back_to_edge_name_then_anystate() {
        let mut machine = Machine::new();
        machine.from::<Idle>().to_previous().build().unwrap();
        machine
            .from::<Idle>()
            .to_resolved(|| Some(StateId::of::<Walk>()))
            .named("pick")
            .build()
            .unwrap();

        assert_eq!(
            machine.diagram(),
            "stateDiagram-v2\n\
             \x20   Idle --> AnyState\n\
             \x20   Idle --> pick\n"
        );
    }
}
