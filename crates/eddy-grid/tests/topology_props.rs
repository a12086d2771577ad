use eddy_core::Face;
use eddy_grid::{Domain, FluidMask, GridTopology};
use proptest::prelude::*;

fn domain_strategy() -> impl Strategy<Value = Domain> {
    (
        prop::array::uniform3(-10.0f64..10.0),
        prop::array::uniform3(0.1f64..5.0),
        prop::array::uniform3(1usize..7),
    )
        .prop_map(|(min, extent, n)| {
            let max = [min[0] + extent[0], min[1] + extent[1], min[2] + extent[2]];
            Domain::new(min, max, n).unwrap()
        })
}

proptest! {
    #[test]
    fn rebuilding_topology_is_idempotent(domain in domain_strategy()) {
        let a = GridTopology::new(domain.clone());
        let b = GridTopology::new(domain);
        prop_assert_eq!(a.coordinates(), b.coordinates());
        prop_assert_eq!(a.mesh(), b.mesh());
    }

    #[test]
    fn coordinates_lie_inside_domain(domain in domain_strategy()) {
        let t = GridTopology::new(domain);
        let (min, max) = (t.domain().min(), t.domain().max());
        for p in t.coordinates() {
            for a in 0..3 {
                prop_assert!(p[a] > min[a] && p[a] < max[a]);
            }
        }
        prop_assert_eq!(t.coordinates().len(), t.mesh().interior_len());
    }

    #[test]
    fn coordinate_adjacency_agrees_with_index_layers(domain in domain_strategy()) {
        let t = GridTopology::new(domain);
        let m = t.mesh();
        for idx in m.interior_indices() {
            let touching = m.touching_faces(idx);
            for face in Face::ALL {
                prop_assert_eq!(t.is_adjacent(idx, face), touching.contains(&face));
            }
        }
    }
}

#[test]
fn all_fluid_mask_matches_interior() {
    let t = GridTopology::new(Domain::unit_cells([4, 3, 2]).unwrap());
    let mask = FluidMask::all_fluid(t.mesh());
    let fluid: Vec<usize> = mask.fluid_indices().collect();
    let interior: Vec<usize> = t.mesh().interior_indices().collect();
    assert_eq!(fluid, interior);
}
