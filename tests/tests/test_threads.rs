// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use weft::descriptor::{ClassDescriptor, PrimKind, TypeSpec};
use weft::{obj_ref, ObjectValue, Value, Weft, WeftPool};

fn build_weft() -> Weft {
    let mut weft = Weft::default().track_ref(true);
    let point = ClassDescriptor::builder("demo.Point")
        .field("x", TypeSpec::Prim(PrimKind::Int32))
        .field("y", TypeSpec::Prim(PrimKind::Int32))
        .build();
    weft.register(point, 100).unwrap();
    weft
}

fn point(x: i32, y: i32) -> weft::ObjRef {
    obj_ref(Value::Object(ObjectValue::new(
        "demo.Point",
        vec![obj_ref(Value::Int32(x)), obj_ref(Value::Int32(y))],
    )))
}

#[test]
fn test_pool_under_contention_serves_every_caller() {
    const THREADS: usize = 8;
    const ROUNDS: usize = 200;

    let pool = Arc::new(WeftPool::new(1, 2, build_weft));
    let completed = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let pool = pool.clone();
            let completed = completed.clone();
            std::thread::spawn(move || {
                for round in 0..ROUNDS {
                    let x = (t * ROUNDS + round) as i32;
                    pool.run(|weft| {
                        let value = point(x, -x);
                        let bytes = weft.serialize(&value).unwrap();
                        let back = weft.deserialize(&bytes).unwrap();
                        assert_eq!(*back.borrow(), *value.borrow());
                    });
                    completed.fetch_add(1, Ordering::Relaxed);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(completed.load(Ordering::Relaxed), THREADS * ROUNDS);
    // every instance came back; the pool never grew past its bound
    assert!(pool.idle_count() <= 2);
}

#[test]
fn test_pool_instances_are_isolated_sessions() {
    // two instances serialized interleaved graphs; reference ids must not
    // leak between them
    let pool = Arc::new(WeftPool::new(2, 2, build_weft));
    let a = pool.acquire();
    let b = pool.acquire();

    let shared = point(1, 2);
    let list = obj_ref(Value::List(vec![shared.clone(), shared]));
    let bytes_a = a.serialize(&list).unwrap();
    let bytes_b = b.serialize(&list).unwrap();
    assert_eq!(bytes_a, bytes_b);

    pool.release(a);
    pool.release(b);
}
