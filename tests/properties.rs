use lifetime_semantics_demo::{AllocStats, OwnedBuf};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Push(Vec<u8>),
    Copy(usize),
    Take(usize),
    CopyAssign(usize, usize),
    MoveAssign(usize, usize),
    Drop(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        proptest::collection::vec(any::<u8>(), 0..16).prop_map(Op::Push),
        any::<usize>().prop_map(Op::Copy),
        any::<usize>().prop_map(Op::Take),
        (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::CopyAssign(a, b)),
        (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::MoveAssign(a, b)),
        any::<usize>().prop_map(Op::Drop),
    ]
}

proptest! {
    #[test]
    fn copies_never_alias(content in proptest::collection::vec(any::<u8>(), 1..64)) {
        let mut a = OwnedBuf::from_bytes(&content).unwrap();
        let mut b = a.try_clone().unwrap();
        let mut c = OwnedBuf::from_bytes(b"placeholder").unwrap();
        c.copy_assign(&a).unwrap();

        a.as_bytes_mut()[0] ^= 0xff;
        prop_assert_eq!(b.as_bytes(), &content[..]);
        prop_assert_eq!(c.as_bytes(), &content[..]);

        b.as_bytes_mut()[0] ^= 0x0f;
        prop_assert_eq!(c.as_bytes(), &content[..]);
        prop_assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn move_empties_source(content in proptest::collection::vec(any::<u8>(), 0..64)) {
        let stats = AllocStats::new();
        let mut a = OwnedBuf::from_bytes_in(&content, &stats).unwrap();
        let b = a.take();
        prop_assert_eq!(b.as_bytes(), &content[..]);
        prop_assert!(a.is_empty());
        prop_assert!(!a.is_allocated());
        prop_assert_eq!(stats.allocations(), 1);

        let mut c = OwnedBuf::from_bytes_in(b"old", &stats).unwrap();
        let mut b = b;
        c.move_assign(&mut b);
        prop_assert_eq!(c.as_bytes(), &content[..]);
        prop_assert!(b.is_empty());
    }

    #[test]
    fn reassigning_from_self_keeps_content(content in proptest::collection::vec(any::<u8>(), 0..64)) {
        let stats = AllocStats::new();
        let mut a = OwnedBuf::from_bytes_in(&content, &stats).unwrap();

        let same = a.clone();
        a.copy_assign(&same).unwrap();
        prop_assert_eq!(a.as_bytes(), &content[..]);

        let mut out = a.take();
        a.move_assign(&mut out);
        prop_assert_eq!(a.as_bytes(), &content[..]);

        drop(same);
        drop(out);
        drop(a);
        prop_assert_eq!(stats.live(), 0);
    }

    #[test]
    fn every_allocation_released_once(ops in proptest::collection::vec(op(), 0..64)) {
        let stats = AllocStats::new();
        {
            let mut live: Vec<OwnedBuf<&AllocStats>> = Vec::new();
            for op in ops {
                let n = live.len();
                match op {
                    Op::Push(bytes) => live.push(OwnedBuf::from_bytes_in(&bytes, &stats).unwrap()),
                    Op::Copy(i) if n > 0 => {
                        let copy = live[i % n].try_clone().unwrap();
                        live.push(copy);
                    }
                    Op::Take(i) if n > 0 => {
                        let moved = live[i % n].take();
                        live.push(moved);
                    }
                    Op::CopyAssign(i, j) if n > 0 => {
                        let source = live[j % n].try_clone().unwrap();
                        live[i % n].copy_assign(&source).unwrap();
                    }
                    Op::MoveAssign(i, j) if n > 1 && i % n != j % n => {
                        let (i, j) = (i % n, j % n);
                        let (lo, hi) = live.split_at_mut(i.max(j));
                        if i < j {
                            lo[i].move_assign(&mut hi[0]);
                        } else {
                            hi[0].move_assign(&mut lo[j]);
                        }
                    }
                    Op::Drop(i) if n > 0 => {
                        live.swap_remove(i % n);
                    }
                    _ => {}
                }
                let owned = live.iter().filter(|buf| buf.is_allocated()).count();
                prop_assert_eq!(stats.live(), owned);
            }
        }
        prop_assert_eq!(stats.live(), 0);
        prop_assert_eq!(stats.live_bytes(), 0);
    }
}

#[test]
fn round_trip_abc() {
    let buf = OwnedBuf::try_from(c"abc").unwrap();
    assert_eq!(buf.len(), 3);
    assert_eq!(&*buf, b"abc");
    assert_eq!(buf.as_bytes_with_nul(), b"abc\0");
}

#[test]
fn copy_assign_scenario() {
    let stats = AllocStats::new();
    let o1 = OwnedBuf::from_bytes_in(b"abc", &stats).unwrap();
    let o2 = o1.try_clone().unwrap();
    assert_eq!(o2.as_bytes(), b"abc");
    assert_eq!(o1.as_bytes(), b"abc");
    assert_ne!(o1.as_ptr(), o2.as_ptr());

    let mut o3 = OwnedBuf::from_bytes_in(b"def", &stats).unwrap();
    o3.copy_assign(&o2).unwrap();
    assert_eq!(o3.as_bytes(), b"abc");
    assert_eq!(stats.releases(), 1);
}

#[test]
fn move_scenario() {
    let stats = AllocStats::new();
    let mut p = OwnedBuf::from_bytes_in(b"abc", &stats).unwrap();
    let q = p.take();
    assert_eq!(q.as_bytes(), b"abc");
    assert_eq!(p.as_bytes(), b"");
    assert_eq!(stats.allocations(), 1);
}
