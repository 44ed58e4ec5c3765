//! Feasibility of a station allocation.

use evnet_core::{Allocation, Diagnostics, IssueCategory, Network, ReferenceLocation};

/// Check an allocation against every constraint family and report all
/// violations.
///
/// An allocation is feasible when it has no errors:
///
/// - `budget`: total stations ≤ budget
/// - `capacity`: each site within `[min_capacity, max_capacity]`
/// - `coverage`: each reference neighborhood holds at least `min_supply`
///
/// Integrality holds by construction (`usize` counts). Every family is
/// evaluated even when an earlier one already failed.
pub fn check_feasibility(
    network: &Network,
    reference_locations: &[ReferenceLocation],
    budget: usize,
    allocation: &Allocation,
) -> Diagnostics {
    let mut diag = Diagnostics::new();

    if allocation.len() != network.num_sites() {
        diag.error(
            IssueCategory::Allocation,
            format!(
                "allocation has {} entries for {} sites",
                allocation.len(),
                network.num_sites()
            ),
        );
        return diag;
    }

    let total = allocation.total();
    if total > budget {
        diag.error(
            IssueCategory::Budget,
            format!("{total} stations allocated, budget is {budget}"),
        );
    }

    for (site, &stations) in network.sites().iter().zip(allocation.iter()) {
        if stations < site.min_capacity {
            diag.error_at(
                IssueCategory::Capacity,
                site.label(),
                format!("{stations} stations below minimum {}", site.min_capacity),
            );
        }
        if stations > site.max_capacity {
            diag.error_at(
                IssueCategory::Capacity,
                site.label(),
                format!("{stations} stations above maximum {}", site.max_capacity),
            );
        }
    }

    for (idx, reference) in reference_locations.iter().enumerate() {
        let supply = reference.supply(allocation);
        if supply < reference.min_supply {
            diag.error_at(
                IssueCategory::Coverage,
                format!("Reference {idx}"),
                format!(
                    "{supply} stations within {} of {}, need {}",
                    reference.neighborhood_radius, reference.location, reference.min_supply
                ),
            );
        }
    }

    diag
}

/// `true` when [`check_feasibility`] reports no errors
pub fn is_feasible(
    network: &Network,
    reference_locations: &[ReferenceLocation],
    budget: usize,
    allocation: &Allocation,
) -> bool {
    !check_feasibility(network, reference_locations, budget, allocation).has_errors()
}
