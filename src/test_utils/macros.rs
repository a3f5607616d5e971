/// Asserts that the next item of an [`EventIterator`](crate::EventIterator) is a record equal to
/// `$expected`.
#[macro_export]
macro_rules! assert_next_event {
    ($iter: expr, $expected: expr) => {
        $crate::assert_next_event!($iter, $expected, timeout = 5)
    };
    ($iter: expr, $expected: expr, timeout = $secs: expr) => {
        let message = tokio::time::timeout(std::time::Duration::from_secs($secs), $iter.next())
            .await
            .expect("timed out");
        let expected = &$expected;
        match message {
            std::option::Option::Some(std::result::Result::Ok(typed)) => {
                assert_eq!(
                    &typed.event, expected,
                    "Expected {:?}, got {:?}", expected, typed.event
                );
            }
            std::option::Option::Some(std::result::Result::Err(e)) => {
                panic!("Expected Ok({:?}), got Err({:?})", expected, e);
            }
            std::option::Option::None => {
                panic!("Expected Ok({:?}), but iteration ended", expected);
            }
        }
    };
}

/// Asserts that the iterator ends without an error.
#[macro_export]
macro_rules! assert_exhausted {
    ($iter: expr) => {
        $crate::assert_exhausted!($iter, timeout = 5)
    };
    ($iter: expr, timeout = $secs: expr) => {
        let message = tokio::time::timeout(std::time::Duration::from_secs($secs), $iter.next())
            .await
            .expect("timed out");
        if let std::option::Option::Some(item) = message {
            panic!("Expected iteration to end, got {:?}", item.map(|typed| typed.event));
        }
        assert!($iter.state().error().is_none(), "Iterator ended with {:?}", $iter.state());
    };
}

/// Asserts that the next item is an error matching `$pattern`.
#[macro_export]
macro_rules! assert_failed {
    ($iter: expr, $pattern: pat) => {
        let message = tokio::time::timeout(std::time::Duration::from_secs(5), $iter.next())
            .await
            .expect("timed out");
        match message {
            std::option::Option::Some(std::result::Result::Err(err)) => {
                assert!(
                    matches!(err, $pattern),
                    "Expected {}, got {:?}",
                    stringify!($pattern),
                    err
                );
            }
            std::option::Option::Some(std::result::Result::Ok(typed)) => {
                panic!("Expected {}, got event {:?}", stringify!($pattern), typed.event);
            }
            std::option::Option::None => {
                panic!("Expected {}, but iteration ended", stringify!($pattern));
            }
        }
    };
}
