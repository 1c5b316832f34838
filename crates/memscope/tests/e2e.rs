// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use memscope::{Allocator, Handle, MemError, Owner, format_alloc};

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn track(
        allocator: &mut Allocator,
        handle: Handle,
        name: &'static str,
        log: &Rc<RefCell<Vec<String>>>,
    ) {
        let log = log.clone();

        allocator
            .set_destructor(handle, move |d| {
                let body = String::from_utf8_lossy(d.body()).into_owned();
                log.borrow_mut().push(format!("{name}:{body}"));
            })
            .expect("Failed to set_destructor(..)");
    }

    #[test]
    fn test_stolen_allocation_outlives_inner_scope() {
        init_logging();

        let log = Rc::new(RefCell::new(Vec::new()));
        let mut allocator = Allocator::new();

        let s1 = allocator.open_scope();
        let a = allocator.duplicate(b"a").expect("Failed to duplicate(..)");
        track(&mut allocator, a, "A", &log);

        let s2 = allocator.open_scope();
        let b = allocator.duplicate(b"b").expect("Failed to duplicate(..)");
        track(&mut allocator, b, "B", &log);
        allocator.reparent(b, a).expect("Failed to reparent(..)");

        allocator.close_scope(s2);

        assert!(log.borrow().is_empty());
        assert!(allocator.is_live(b));
        assert_eq!(allocator.owner_of(b), Some(Owner::Allocation(a)));

        allocator.close_scope(s1);

        assert_eq!(*log.borrow(), vec!["A:a", "B:b"]);
        assert_eq!(allocator.depth(), 0);
        assert_eq!(allocator.live_allocations(), 0);
    }

    #[test]
    fn test_request_lifecycle() {
        init_logging();

        let log = Rc::new(RefCell::new(Vec::new()));
        let mut allocator = Allocator::new();

        let response = {
            let mut request = allocator.scope();

            let path = request
                .duplicate_string(b"/index.html")
                .expect("Failed to duplicate_string(..)");
            let header = format_alloc!(request, "GET {} HTTP/1.1", "/index.html")
                .expect("Failed to format_alloc!(..)");
            request.reparent(path, header).expect("Failed to reparent(..)");
            track(&mut request, header, "header", &log);

            let response = request.allocate(16).expect("Failed to allocate(..)");
            request
                .bytes_mut(response)
                .expect("Failed to bytes_mut(..)")[..2]
                .copy_from_slice(b"OK");

            assert_eq!(request.live_allocations(), 3);
            assert_eq!(
                request.c_str(header).map(|s| s.to_bytes()),
                Ok(&b"GET /index.html HTTP/1.1"[..])
            );

            response
        };

        assert_eq!(*log.borrow(), vec!["header:GET /index.html HTTP/1.1\0"]);
        assert!(!allocator.is_live(response));
        assert_eq!(allocator.allocate(1), Err(MemError::NoActiveScope));
    }

    #[test]
    fn test_secure_secret_released_with_owner() {
        init_logging();

        let mut allocator = Allocator::new();
        let mut session = allocator.scope();

        let session_state = session.allocate(32).expect("Failed to allocate(..)");
        let key = session.duplicate(b"0123456789abcdef").expect("Failed to duplicate(..)");
        session.mark_secure(key).expect("Failed to mark_secure(..)");
        session.reparent(key, session_state).expect("Failed to reparent(..)");

        assert!(session.is_secure(key));
        assert_eq!(session.children(session_state), vec![key]);

        session.free(session_state).expect("Failed to free(..)");

        assert!(!session.is_live(key));
        assert_eq!(session.live_allocations(), 0);
    }
}
