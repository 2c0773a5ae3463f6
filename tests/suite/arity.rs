//! Argument tuples across the supported arities.

use std::rc::Rc;

use callkit::{ArgSlot, Args, FuncFactory, MAX_ARITY, args};

fn as_u32s(values: &[&dyn ArgSlot]) -> Vec<u32> {
    values
        .iter()
        .map(|slot| *slot.downcast_ref::<u32>().expect("u32 slot"))
        .collect()
}

#[test]
fn ordered_values_follow_constructor_order_at_every_arity() {
    assert!(as_u32s(&args!().to_ordered_values()).is_empty());
    assert_eq!(as_u32s(&args!(1_u32).to_ordered_values()), [1]);
    assert_eq!(as_u32s(&args!(1_u32, 2_u32).to_ordered_values()), [1, 2]);
    assert_eq!(
        as_u32s(&args!(5_u32, 4_u32, 3_u32, 2_u32, 1_u32).to_ordered_values()),
        [5, 4, 3, 2, 1]
    );

    let widest = args!(
        1_u32, 2_u32, 3_u32, 4_u32, 5_u32, 6_u32, 7_u32, 8_u32, 9_u32, 10_u32, 11_u32, 12_u32
    );
    let values = as_u32s(&widest.to_ordered_values());
    assert_eq!(values.len(), MAX_ARITY);
    assert_eq!(values, (1..=12).collect::<Vec<u32>>());
}

#[test]
fn heterogeneous_slots_keep_their_types() {
    let tuple = args!("replica", 3_u8, Some(2.5_f64));
    let values = tuple.to_ordered_values();

    assert_eq!(values[0].downcast_ref::<&str>(), Some(&"replica"));
    assert_eq!(values[1].downcast_ref::<u8>(), Some(&3));
    assert_eq!(values[2].downcast_ref::<Option<f64>>(), Some(&Some(2.5)));
    assert!(values[1].downcast_ref::<u32>().is_none());
}

#[test]
fn clone_is_equal_until_a_slot_changes() {
    let original = args!("host".to_string(), 443_u16);
    let mut copy = original.clone();
    assert_eq!(copy, original);

    copy.slots_mut().1 = 8443;
    assert_ne!(copy, original);
    assert_eq!(original.slots().1, 443);
}

#[test]
fn clone_shares_referenced_values() {
    let shared = Rc::new(vec![1, 2, 3]);
    let original = args!(Rc::clone(&shared));
    let copy = original.clone();

    assert!(Rc::ptr_eq(&original.slots().0, &copy.slots().0));
}

#[test]
fn wrapper_rebinds_slots_between_calls() {
    let mut sum = FuncFactory::new(|a: u32, b: u32, c: u32| a + b + c, args!(1_u32, 2_u32, 3_u32));
    assert_eq!(sum.execute(), Ok(6));

    *sum.args_mut() = Args::new((10, 20, 30));
    assert_eq!(sum.execute(), Ok(60));
    assert_eq!(sum.args().to_string(), "(10, 20, 30)");
}
