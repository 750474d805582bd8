//! The record list driving its pool: inserts until the pool rejects one,
//! then frees and reuses node storage.

use mempool::RecordList;

fn show(list: &RecordList) {
    let values: Vec<u16> = list.iter().collect();
    println!("list ({} nodes): {values:?}", list.len());
}

fn main() {
    let mut list = RecordList::new(5);

    for value in [10, 20, 30, 40, 50] {
        match list.insert(value) {
            Ok(()) => println!("inserted {value}"),
            Err(error) => println!("insert of {value} rejected: {error}"),
        }
    }
    show(&list);

    // The pool is full now; the next insert is rejected but harmless.
    if let Err(error) = list.insert(60) {
        println!("insert of 60 rejected: {error}");
    }
    show(&list);

    println!("removing 30");
    list.remove(30);
    show(&list);

    // The freed node makes room again.
    list.insert_after(20, 25).unwrap();
    show(&list);

    list.clear();
    show(&list);
}
