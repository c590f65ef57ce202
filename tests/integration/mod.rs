mod kite_tests;
